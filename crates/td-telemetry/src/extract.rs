//! Extracts time-sorted telemetry and a GPS polyline for a requested range (§4.3).

use td_models::{is_valid_gps, DayCollection, GpsPath, GpsPoint, TelemetrySample};
use tokio::sync::watch;

use crate::decoder::SeiDecoder;
use crate::error::TelemetryResult;

/// Result of one extraction pass. `cancelled` is set when the caller's signal fired before every
/// intersecting segment was processed; `samples`/`gps_path` hold whatever was decoded so far.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub samples: Vec<TelemetrySample>,
    pub gps_path: GpsPath,
    pub cancelled: bool,
}

/// Extract telemetry for `[start_ms, end_ms]` from `collection`, never holding more than one
/// segment's bytes in memory at a time (§4.3). `segment_duration_ms` (sourced from
/// `EngineConfig::default_segment_duration_ms`, §1.3) bounds each segment's nominal window.
pub async fn extract_telemetry(
    collection: &DayCollection,
    start_ms: i64,
    end_ms: i64,
    segment_duration_ms: i64,
    decoder: &dyn SeiDecoder,
    mut cancel: watch::Receiver<bool>,
) -> TelemetryResult<ExtractionOutcome> {
    let mut samples = Vec::new();

    for (group, &seg_start_ms) in collection.groups.iter().zip(&collection.segment_starts_ms) {
        let seg_end_ms = seg_start_ms + segment_duration_ms;
        if seg_end_ms <= start_ms || seg_start_ms >= end_ms {
            continue;
        }

        if *cancel.borrow() {
            let samples = finish(samples);
            let gps_path = derive_gps_path(&samples);
            return Ok(ExtractionOutcome {
                samples,
                gps_path,
                cancelled: true,
            });
        }

        let Some(source) = group.preferred_telemetry_source() else {
            continue;
        };

        let bytes = match tokio::fs::read(&source.file.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(
                    path = %source.file.path.display(),
                    error = %err,
                    "failed to read segment, skipping"
                );
                continue;
            }
        };

        let frames = match decoder.decode_frames(&bytes) {
            Ok(frames) => frames,
            Err(err) => {
                tracing::warn!(group_id = %group.id, error = %err, "decoder failed on segment, skipping");
                continue;
            }
        };

        let mut seg_local_ms: i64 = 0;
        for frame in frames {
            seg_local_ms += frame.duration_ms as i64;
            if let Some(sei) = frame.sei {
                samples.push(TelemetrySample {
                    timestamp_ms: seg_start_ms + seg_local_ms,
                    speed_mps: sei.speed_mps,
                    gear: sei.gear,
                    autopilot: sei.autopilot,
                    blinker_left: sei.blinker_left,
                    blinker_right: sei.blinker_right,
                    brake: sei.brake,
                    accelerator_pct: sei.accelerator_pct,
                    steering_angle_deg: sei.steering_angle_deg,
                    latitude_deg: sei.latitude_deg,
                    longitude_deg: sei.longitude_deg,
                    heading_deg: sei.heading_deg,
                });
            }
        }
    }

    let samples = finish(samples);
    let gps_path = derive_gps_path(&samples);

    Ok(ExtractionOutcome {
        samples,
        gps_path,
        cancelled: false,
    })
}

fn finish(mut samples: Vec<TelemetrySample>) -> Vec<TelemetrySample> {
    samples.sort_by_key(|s| s.timestamp_ms);
    samples
}

fn derive_gps_path(samples: &[TelemetrySample]) -> GpsPath {
    samples
        .iter()
        .filter_map(|s| {
            let (lat, lon) = (s.latitude_deg?, s.longitude_deg?);
            is_valid_gps(lat, lon).then_some(GpsPoint {
                lat,
                lon,
                timestamp_ms: s.timestamp_ms,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{DecodeError, DecodedFrame, RawSei};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use td_models::{
        Autopilot, Camera, ClipFile, ClipGroup, ClipType, FileDescriptor, FileIdentity, Gear,
    };

    struct FakeDecoder {
        frame_ms: u32,
        fail_calls: AtomicUsize,
    }

    impl SeiDecoder for FakeDecoder {
        fn decode_frames(&self, bytes: &[u8]) -> Result<Vec<DecodedFrame>, DecodeError> {
            if bytes == b"bad" {
                self.fail_calls.fetch_add(1, Ordering::SeqCst);
                return Err(DecodeError::Failed("synthetic failure".into()));
            }
            Ok(vec![DecodedFrame {
                duration_ms: self.frame_ms,
                sei: Some(RawSei {
                    speed_mps: 10.0,
                    gear: Gear::Drive,
                    autopilot: Autopilot::Manual,
                    blinker_left: false,
                    blinker_right: false,
                    brake: false,
                    accelerator_pct: 0.0,
                    steering_angle_deg: 0.0,
                    latitude_deg: Some(37.0),
                    longitude_deg: Some(-122.0),
                    heading_deg: Some(0.0),
                }),
            }])
        }
    }

    fn group_with_file(timestamp_key: &str, contents: &[u8], dir: &std::path::Path) -> ClipGroup {
        let path = dir.join(format!("{timestamp_key}.mp4"));
        std::fs::write(&path, contents).unwrap();
        let file = FileDescriptor {
            path: path.clone(),
            rel_path: path.to_string_lossy().into_owned(),
            size: contents.len() as u64,
            identity: FileIdentity::from_size_and_mtime(contents.len() as u64, 0),
        };
        let mut files_by_camera = std::collections::BTreeMap::new();
        files_by_camera.insert(
            Camera::Front,
            ClipFile {
                clip_type: ClipType::Recent,
                event_id: None,
                timestamp_key: timestamp_key.to_string(),
                camera: Camera::Front,
                camera_raw: "front".to_string(),
                file,
            },
        );
        ClipGroup {
            id: timestamp_key.to_string(),
            clip_type: ClipType::Recent,
            event_id: None,
            timestamp_key: timestamp_key.to_string(),
            files_by_camera,
            event_meta: None,
            event_json: None,
            event_png: None,
            event_mp4: None,
        }
    }

    #[tokio::test]
    async fn extracts_and_sorts_samples_with_gps() {
        let dir = tempfile::tempdir().unwrap();
        let collection = DayCollection {
            id: "c".into(),
            day: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            clip_type: ClipType::Recent,
            groups: vec![
                group_with_file("seg0", b"ok", dir.path()),
                group_with_file("seg1", b"ok", dir.path()),
            ],
            segment_starts_ms: vec![0, 60_000],
            duration_ms: 120_000,
            anchor_ms: None,
            anchor_group_id: None,
        };
        let decoder = FakeDecoder {
            frame_ms: 1_000,
            fail_calls: AtomicUsize::new(0),
        };
        let (_tx, rx) = watch::channel(false);

        let outcome = extract_telemetry(&collection, 0, 120_000, 60_000, &decoder, rx)
            .await
            .unwrap();

        assert_eq!(outcome.samples.len(), 2);
        assert!(outcome.samples.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
        assert_eq!(outcome.gps_path.len(), 2);
        assert!(!outcome.cancelled);
    }

    #[tokio::test]
    async fn decoder_failure_on_one_segment_does_not_abort_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let collection = DayCollection {
            id: "c".into(),
            day: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            clip_type: ClipType::Recent,
            groups: vec![
                group_with_file("seg0", b"bad", dir.path()),
                group_with_file("seg1", b"ok", dir.path()),
            ],
            segment_starts_ms: vec![0, 60_000],
            duration_ms: 120_000,
            anchor_ms: None,
            anchor_group_id: None,
        };
        let decoder = FakeDecoder {
            frame_ms: 1_000,
            fail_calls: AtomicUsize::new(0),
        };
        let (_tx, rx) = watch::channel(false);

        let outcome = extract_telemetry(&collection, 0, 120_000, 60_000, &decoder, rx)
            .await
            .unwrap();

        assert_eq!(outcome.samples.len(), 1);
        assert_eq!(decoder.fail_calls.load(Ordering::SeqCst), 1);
    }
}
