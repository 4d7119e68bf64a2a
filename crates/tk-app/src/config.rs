//! Control unit configuration.
//!
//! Loaded from YAML; every key is optional and falls back to the defaults
//! below. Values are fixed for the lifetime of a [`crate::ControlUnit`].
//!
//! ```yaml
//! l1_cm: 20.0
//! l2_cm: 40.0
//! t1_ms: 10000
//! t2_ms: 10000
//! tick_ms: 500
//! history_capacity: 100
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tk_controls::{ConnectivityWatchdog, DEFAULT_TICK_MS, HysteresisPolicy, TickConfig};
use tk_core::{Millis, Real};
use tk_state::DEFAULT_HISTORY_CAPACITY;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    /// Safe level threshold (cm).
    pub l1_cm: Real,
    /// Critical level threshold (cm).
    pub l2_cm: Real,
    /// Debounce inside the L1..L2 band before half opening (ms).
    pub t1_ms: Millis,
    /// Telemetry silence before the unit is considered unconnected (ms).
    pub t2_ms: Millis,
    /// Control loop period (ms).
    pub tick_ms: Millis,
    /// Number of level readings kept in history.
    pub history_capacity: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            l1_cm: 20.0,
            l2_cm: 40.0,
            t1_ms: 10_000,
            t2_ms: 10_000,
            tick_ms: DEFAULT_TICK_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> AppResult<()> {
        if !self.l1_cm.is_finite() {
            return Err(invalid("l1_cm", "must be finite"));
        }
        if !self.l2_cm.is_finite() {
            return Err(invalid("l2_cm", "must be finite"));
        }
        if self.l1_cm >= self.l2_cm {
            return Err(invalid(
                "l1_cm",
                format!("must be below l2_cm ({} >= {})", self.l1_cm, self.l2_cm),
            ));
        }
        if self.t2_ms == 0 {
            return Err(invalid("t2_ms", "must be positive"));
        }
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms", "must be positive"));
        }
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity", "must be at least 1"));
        }
        Ok(())
    }

    /// Validate and return `self`, for programmatic construction.
    pub fn validated(self) -> AppResult<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn policy(&self) -> AppResult<HysteresisPolicy> {
        Ok(HysteresisPolicy::new(self.l1_cm, self.l2_cm, self.t1_ms)?)
    }

    pub fn watchdog(&self) -> AppResult<ConnectivityWatchdog> {
        Ok(ConnectivityWatchdog::new(self.t2_ms)?)
    }

    pub fn tick(&self) -> AppResult<TickConfig> {
        Ok(TickConfig::new(self.tick_ms)?)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> AppError {
    AppError::Config {
        field,
        reason: reason.into(),
    }
}

pub fn from_yaml_str(content: &str) -> AppResult<ControlConfig> {
    // An empty document means "all defaults".
    if content.trim().is_empty() {
        return Ok(ControlConfig::default());
    }
    let config: ControlConfig = serde_yaml::from_str(content)?;
    config.validated()
}

pub fn load_yaml(path: &Path) -> AppResult<ControlConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    from_yaml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_plant() {
        let config = ControlConfig::default();
        assert_eq!(config.l1_cm, 20.0);
        assert_eq!(config.l2_cm, 40.0);
        assert_eq!(config.t1_ms, 10_000);
        assert_eq!(config.t2_ms, 10_000);
        assert_eq!(config.tick_ms, 500);
        assert_eq!(config.history_capacity, 100);
        config.validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = from_yaml_str("l2_cm: 55.5\ntick_ms: 100\n").unwrap();
        assert_eq!(config.l2_cm, 55.5);
        assert_eq!(config.tick_ms, 100);
        assert_eq!(config.l1_cm, 20.0);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(from_yaml_str("  \n").unwrap(), ControlConfig::default());
    }

    #[test]
    fn unknown_key_rejected() {
        let err = from_yaml_str("l3_cm: 10\n").unwrap_err();
        assert!(matches!(err, AppError::Yaml(_)));
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let err = from_yaml_str("l1_cm: 50\nl2_cm: 40\n").unwrap_err();
        assert!(matches!(err, AppError::Config { field: "l1_cm", .. }));
    }

    #[test]
    fn zero_values_rejected() {
        for (yaml, field) in [
            ("t2_ms: 0", "t2_ms"),
            ("tick_ms: 0", "tick_ms"),
            ("history_capacity: 0", "history_capacity"),
        ] {
            match from_yaml_str(yaml) {
                Err(AppError::Config { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected config error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn yaml_round_trip() {
        let config = ControlConfig {
            l1_cm: 15.0,
            t1_ms: 2_000,
            ..ControlConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn load_yaml_reports_missing_file() {
        let path = std::env::temp_dir().join("tk_app_missing_config.yaml");
        let _ = std::fs::remove_file(&path);
        let err = load_yaml(&path).unwrap_err();
        assert!(matches!(err, AppError::ConfigRead { .. }));
    }

    #[test]
    fn load_yaml_from_file() {
        let path = std::env::temp_dir().join("tk_app_config_test.yaml");
        std::fs::write(&path, "l1_cm: 10\nl2_cm: 30\nt1_ms: 500\n").unwrap();
        let config = load_yaml(&path).unwrap();
        assert_eq!(
            config.policy().unwrap(),
            HysteresisPolicy::new(10.0, 30.0, 500).unwrap()
        );
        let _ = std::fs::remove_file(&path);
    }
}
