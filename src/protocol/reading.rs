use serde::{Serialize, Serializer};

/// Direction token reported by the firmware.
///
/// The token is free-form on the wire. Anything other than the four
/// cardinal directions and `CENTER` is kept verbatim (uppercased) in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Center,
    Other(String),
}

impl Direction {
    /// Builds a direction from a raw token, trimming and uppercasing it.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim().to_uppercase();
        match token.as_str() {
            "UP" => Direction::Up,
            "DOWN" => Direction::Down,
            "LEFT" => Direction::Left,
            "RIGHT" => Direction::Right,
            "CENTER" => Direction::Center,
            _ => Direction::Other(token),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
            Direction::Center => "CENTER",
            Direction::Other(token) => token,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One parsed telemetry sample. Axis values are volts as sent by the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub x: f64,
    pub y: f64,
    pub direction: Direction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_map_to_variants() {
        assert_eq!(Direction::from_token("up"), Direction::Up);
        assert_eq!(Direction::from_token(" Down "), Direction::Down);
        assert_eq!(Direction::from_token("LEFT"), Direction::Left);
        assert_eq!(Direction::from_token("right"), Direction::Right);
        assert_eq!(Direction::from_token("center"), Direction::Center);
    }

    #[test]
    fn unknown_token_is_kept_uppercased() {
        let dir = Direction::from_token("diag-ne");
        assert_eq!(dir, Direction::Other("DIAG-NE".into()));
        assert_eq!(dir.as_str(), "DIAG-NE");
    }

    #[test]
    fn reading_serializes_direction_as_string() {
        let reading = Reading {
            x: 1.5,
            y: 0.25,
            direction: Direction::Left,
        };
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["direction"], "LEFT");
        assert_eq!(json["x"], 1.5);
    }
}
