//! Operating mode of the control unit.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Who drives the valve.
///
/// - `Automatic`: the level policy drives the valve
/// - `Manual`: only explicit operator commands drive the valve
/// - `Unconnected`: telemetry is lost; the valve holds its last position
///
/// `Unconnected` is entered only by the connectivity watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Automatic,
    Manual,
    Unconnected,
}

impl Mode {
    /// Upper-case wire name, as sent to the actuator and shown to operators.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Automatic => "AUTOMATIC",
            Mode::Manual => "MANUAL",
            Mode::Unconnected => "UNCONNECTED",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUTOMATIC" => Ok(Mode::Automatic),
            "MANUAL" => Ok(Mode::Manual),
            "UNCONNECTED" => Ok(Mode::Unconnected),
            _ => Err(CoreError::UnknownMode { name: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("manual".parse::<Mode>().unwrap(), Mode::Manual);
        assert_eq!(" Automatic ".parse::<Mode>().unwrap(), Mode::Automatic);
        assert_eq!("UNCONNECTED".parse::<Mode>().unwrap(), Mode::Unconnected);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "drain".parse::<Mode>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownMode {
                name: "drain".to_string()
            }
        );
    }

    #[test]
    fn display_matches_serde_name() {
        for mode in [Mode::Automatic, Mode::Manual, Mode::Unconnected] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{mode}\""));
        }
    }
}
