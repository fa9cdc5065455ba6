use log::{debug, warn};

/// Returns true when `name` matches `pattern`. A single `*` matches any run
/// of characters; without a `*` the match is exact.
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
        None => pattern == name,
    }
}

/// Picks the first candidate matching the earliest pattern in `patterns`.
pub fn select_port(candidates: &[String], patterns: &[String]) -> Option<String> {
    let mut sorted: Vec<&String> = candidates.iter().collect();
    sorted.sort();

    patterns.iter().find_map(|pattern| {
        sorted
            .iter()
            .find(|name| matches_pattern(pattern, name))
            .map(|name| (*name).clone())
    })
}

/// Enumerates the system's serial ports and returns the first match.
pub fn discover(patterns: &[String]) -> Option<String> {
    let ports = match serialport::available_ports() {
        Ok(ports) => ports,
        Err(err) => {
            warn!("Failed to enumerate serial ports: {err}");
            return None;
        }
    };

    let names: Vec<String> = ports.into_iter().map(|info| info.port_name).collect();
    debug!("Serial ports present: {names:?}");
    select_port(&names, patterns)
}
