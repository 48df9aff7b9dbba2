//! Nearest-neighbor lookup over a sorted telemetry sample list (§4.3).

use td_models::TelemetrySample;

/// Find the sample whose `timestamp_ms` is closest to `at_ms`. Ties are broken in favor of the
/// earlier sample. `samples` must already be sorted by `timestamp_ms`.
pub fn nearest(samples: &[TelemetrySample], at_ms: i64) -> Option<&TelemetrySample> {
    if samples.is_empty() {
        return None;
    }
    let idx = match samples.binary_search_by_key(&at_ms, |s| s.timestamp_ms) {
        Ok(idx) => return Some(&samples[idx]),
        Err(idx) => idx,
    };

    match (idx.checked_sub(1), samples.get(idx)) {
        (Some(prev_idx), Some(next)) => {
            let prev = &samples[prev_idx];
            let prev_delta = (at_ms - prev.timestamp_ms).abs();
            let next_delta = (next.timestamp_ms - at_ms).abs();
            if next_delta < prev_delta {
                Some(next)
            } else {
                Some(prev)
            }
        }
        (Some(prev_idx), None) => Some(&samples[prev_idx]),
        (None, Some(next)) => Some(next),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_models::{Autopilot, Gear};

    fn sample(timestamp_ms: i64) -> TelemetrySample {
        TelemetrySample {
            timestamp_ms,
            speed_mps: 0.0,
            gear: Gear::Drive,
            autopilot: Autopilot::Manual,
            blinker_left: false,
            blinker_right: false,
            brake: false,
            accelerator_pct: 0.0,
            steering_angle_deg: 0.0,
            latitude_deg: None,
            longitude_deg: None,
            heading_deg: None,
        }
    }

    #[test]
    fn picks_closer_neighbor() {
        let samples = vec![sample(0), sample(100), sample(200)];
        assert_eq!(nearest(&samples, 40).unwrap().timestamp_ms, 0);
        assert_eq!(nearest(&samples, 60).unwrap().timestamp_ms, 100);
    }

    #[test]
    fn ties_favor_earlier_sample() {
        let samples = vec![sample(0), sample(100)];
        assert_eq!(nearest(&samples, 50).unwrap().timestamp_ms, 0);
    }

    #[test]
    fn exact_hit_returns_that_sample() {
        let samples = vec![sample(0), sample(100)];
        assert_eq!(nearest(&samples, 100).unwrap().timestamp_ms, 100);
    }

    #[test]
    fn empty_list_returns_none() {
        let samples: Vec<TelemetrySample> = vec![];
        assert!(nearest(&samples, 10).is_none());
    }
}
