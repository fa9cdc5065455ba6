use super::{Direction, Reading};

/// Prefixes the firmware uses for boot and state chatter.
pub const STATUS_PREFIXES: [&str; 2] = ["SYSTEM", "STATE"];

const FIELD_COUNT: usize = 3;

/// What a single line from the device turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    Blank,
    Status(&'a str),
    Telemetry(Reading),
    Malformed,
}

impl LineKind<'_> {
    pub fn into_reading(self) -> Option<Reading> {
        match self {
            LineKind::Telemetry(reading) => Some(reading),
            _ => None,
        }
    }
}

/// Classifies a raw line. Never fails; anything unrecognised is `Malformed`.
pub fn classify(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }
    if STATUS_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        return LineKind::Status(line);
    }

    match telemetry(line) {
        Some(reading) => LineKind::Telemetry(reading),
        None => LineKind::Malformed,
    }
}

/// Parses `X=<float>,Y=<float>,DIR=<token>` into a [`Reading`].
///
/// Keys are not checked, only the position of each field matters.
pub fn parse(line: &str) -> Option<Reading> {
    classify(line).into_reading()
}

fn telemetry(line: &str) -> Option<Reading> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != FIELD_COUNT {
        return None;
    }

    let x = field_value(fields[0])?.trim().parse::<f64>().ok()?;
    let y = field_value(fields[1])?.trim().parse::<f64>().ok()?;
    let direction = Direction::from_token(field_value(fields[2])?);

    Some(Reading { x, y, direction })
}

fn field_value(field: &str) -> Option<&str> {
    field.split_once('=').map(|(_, value)| value)
}
