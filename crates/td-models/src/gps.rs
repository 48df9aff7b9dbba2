//! GPS polyline derived from telemetry samples.

use serde::{Deserialize, Serialize};

/// One point on the derived route, in collection-relative milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub lat: f64,
    pub lon: f64,
    pub timestamp_ms: i64,
}

pub type GpsPath = Vec<GpsPoint>;

/// `true` iff `(lat, lon)` is a plausible GPS fix: finite, not the `(0, 0)` "no fix" sentinel,
/// and within the valid lat/lon ranges (§3 GpsPath invariant).
pub fn is_valid_gps(lat: f64, lon: f64) -> bool {
    if !lat.is_finite() || !lon.is_finite() {
        return false;
    }
    if lat == 0.0 && lon == 0.0 {
        return false;
    }
    lat.abs() <= 90.0 && lon.abs() <= 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_null_island() {
        assert!(!is_valid_gps(0.0, 0.0));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(!is_valid_gps(91.0, 0.0));
        assert!(!is_valid_gps(0.0, 181.0));
        assert!(!is_valid_gps(f64::NAN, 0.0));
    }

    #[test]
    fn accepts_plausible_fix() {
        assert!(is_valid_gps(37.7749, -122.4194));
    }
}
