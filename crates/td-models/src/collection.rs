//! Day-level clip collections — the roll-up unit presented to callers as a playable unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clip::{ClipGroup, ClipType};

/// Nominal duration of a single Tesla dashcam segment (§2, §9 open question: real footage can
/// deviate; callers with an authoritative per-file duration should prefer it).
pub const NOMINAL_SEGMENT_DURATION_MS: i64 = 60_000;

/// A roll-up of clip groups over a calendar day plus a clip type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCollection {
    pub id: String,
    pub day: NaiveDate,
    pub clip_type: ClipType,
    /// Ascending by `timestampKey`.
    pub groups: Vec<ClipGroup>,
    /// Parallel to `groups`; `segment_starts_ms[0] == 0`, strictly monotonic.
    pub segment_starts_ms: Vec<i64>,
    pub duration_ms: i64,
    pub anchor_ms: Option<i64>,
    pub anchor_group_id: Option<String>,
}

impl DayCollection {
    pub fn make_id(clip_type: &ClipType, day: NaiveDate, discriminator: &str) -> String {
        format!("{}:{}:{}", clip_type.label(), day, discriminator)
    }

    /// Index of the group whose segment window `[start, start+nominal)` contains `at_ms`, if any.
    pub fn group_index_at(&self, at_ms: i64) -> Option<usize> {
        self.segment_starts_ms
            .iter()
            .enumerate()
            .rev()
            .find(|(_, &start)| start <= at_ms)
            .map(|(i, _)| i)
    }

    /// `true` iff `segment_starts_ms` satisfies the invariants in §3: starts at 0, strictly
    /// increasing, and the collection duration covers the last segment's nominal span.
    pub fn invariants_hold(&self) -> bool {
        if self.groups.len() != self.segment_starts_ms.len() {
            return false;
        }
        if self.segment_starts_ms.is_empty() {
            return true;
        }
        if self.segment_starts_ms[0] != 0 {
            return false;
        }
        if !self.segment_starts_ms.windows(2).all(|w| w[0] < w[1]) {
            return false;
        }
        let last = *self.segment_starts_ms.last().unwrap();
        if self.duration_ms < last + NOMINAL_SEGMENT_DURATION_MS {
            return false;
        }
        if let Some(anchor) = self.anchor_ms {
            if anchor < 0 || anchor > self.duration_ms {
                return false;
            }
        }
        true
    }
}

/// The output of a full `Scan`: every recognized clip group, plus the day-level roll-ups.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LibraryIndex {
    pub groups: Vec<ClipGroup>,
    pub day_collections: Vec<DayCollection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipType;

    fn collection(starts: Vec<i64>, duration_ms: i64) -> DayCollection {
        DayCollection {
            id: "x".into(),
            day: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            clip_type: ClipType::Recent,
            groups: starts.iter().map(|_| dummy_group()).collect(),
            segment_starts_ms: starts,
            duration_ms,
            anchor_ms: None,
            anchor_group_id: None,
        }
    }

    fn dummy_group() -> ClipGroup {
        ClipGroup {
            id: "g".into(),
            clip_type: ClipType::Recent,
            event_id: None,
            timestamp_key: "2024-01-01_00-00-00".into(),
            files_by_camera: Default::default(),
            event_meta: None,
            event_json: None,
            event_png: None,
            event_mp4: None,
        }
    }

    #[test]
    fn invariants_reject_non_zero_start() {
        let c = collection(vec![1, 60_000], 130_000);
        assert!(!c.invariants_hold());
    }

    #[test]
    fn invariants_reject_non_monotonic() {
        let c = collection(vec![0, 0], 130_000);
        assert!(!c.invariants_hold());
    }

    #[test]
    fn invariants_accept_well_formed_collection() {
        let c = collection(vec![0, 60_000], 120_000);
        assert!(c.invariants_hold());
    }

    #[test]
    fn group_index_at_locates_segment() {
        let c = collection(vec![0, 60_000, 120_000], 180_000);
        assert_eq!(c.group_index_at(0), Some(0));
        assert_eq!(c.group_index_at(59_999), Some(0));
        assert_eq!(c.group_index_at(60_000), Some(1));
        assert_eq!(c.group_index_at(125_000), Some(2));
    }
}
