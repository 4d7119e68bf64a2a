use crate::CoreError;

/// Floating point type used for levels and thresholds (centimeters).
pub type Real = f64;

/// Lowest valve opening, fully closed.
pub const VALVE_CLOSED: u8 = 0;
/// Half-open valve, commanded after a sustained mid-band level.
pub const VALVE_HALF: u8 = 50;
/// Highest valve opening, fully open.
pub const VALVE_OPEN: u8 = 100;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Clamp any integer to a valve percentage in `[0, 100]`.
pub fn clamp_percent(v: i64) -> u8 {
    v.clamp(VALVE_CLOSED as i64, VALVE_OPEN as i64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_finite_accepts_negative() {
        assert_eq!(ensure_finite(-3.5, "level").unwrap(), -3.5);
    }

    #[test]
    fn clamp_percent_edges() {
        assert_eq!(clamp_percent(-1), 0);
        assert_eq!(clamp_percent(0), 0);
        assert_eq!(clamp_percent(100), 100);
        assert_eq!(clamp_percent(101), 100);
        assert_eq!(clamp_percent(i64::MIN), 0);
        assert_eq!(clamp_percent(i64::MAX), 100);
    }

    proptest! {
        #[test]
        fn clamp_percent_matches_clamp(v in any::<i64>()) {
            prop_assert_eq!(clamp_percent(v) as i64, v.clamp(0, 100));
        }
    }
}
