//! Decodes a relative path within a Tesla footage root into a structured clip descriptor (§4.1).

use td_models::{Camera, ClipType};

use crate::error::RejectReason;

const CLIP_FOLDERS: &[(&str, fn() -> ClipType)] = &[
    ("RecentClips", || ClipType::Recent),
    ("SentryClips", || ClipType::Sentry),
    ("SavedClips", || ClipType::Saved),
];

/// A recognized video clip file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClip {
    pub clip_type: ClipType,
    pub event_id: Option<String>,
    pub timestamp_key: String,
    pub camera: Camera,
    pub camera_raw: String,
}

/// One of the non-video sidecar assets living alongside an event's clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAssetKind {
    Json,
    Png,
    Mp4,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEventAsset {
    pub clip_type: ClipType,
    pub event_id: Option<String>,
    pub kind: EventAssetKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEntry {
    Clip(ParsedClip),
    EventAsset(ParsedEventAsset),
}

/// Length of the fixed `YYYY-MM-DD_HH-MM-SS` prefix.
const TIMESTAMP_LEN: usize = 19;

/// Parse a forward-slash-normalized relative path (§4.1).
pub fn parse(rel_path: &str) -> Result<ParsedEntry, RejectReason> {
    let segments: Vec<&str> = rel_path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((filename, dirs)) = segments.split_last() else {
        return Err(RejectReason::NoFileName);
    };

    let (clip_type, remaining_dirs) = classify_root(dirs);
    let event_id = match clip_type {
        ClipType::Sentry | ClipType::Saved => remaining_dirs.first().map(|s| s.to_string()),
        _ => None,
    };

    if let Some(kind) = event_asset_kind(filename) {
        return Ok(ParsedEntry::EventAsset(ParsedEventAsset {
            clip_type,
            event_id,
            kind,
        }));
    }

    match parse_clip_filename(filename) {
        Some((timestamp_key, camera_raw)) => {
            let camera = Camera::normalize(&camera_raw);
            Ok(ParsedEntry::Clip(ParsedClip {
                clip_type,
                event_id,
                timestamp_key,
                camera,
                camera_raw,
            }))
        }
        None => Err(RejectReason::NotAClipFilename),
    }
}

/// Re-synthesize the relative path a `ParsedClip` was parsed from (round-trip inverse of
/// [`parse`], used by callers that relocate footage without losing the original layout).
pub fn render(clip: &ParsedClip) -> String {
    let mut segments = vec![clip.clip_type.label().to_string()];
    if let Some(event_id) = &clip.event_id {
        segments.push(event_id.clone());
    }
    segments.push(format!("{}-{}.mp4", clip.timestamp_key, clip.camera_raw));
    segments.join("/")
}

fn classify_root<'a>(dirs: &'a [&'a str]) -> (ClipType, &'a [&'a str]) {
    for (idx, segment) in dirs.iter().enumerate() {
        for (name, make) in CLIP_FOLDERS {
            if segment.eq_ignore_ascii_case(name) {
                return (make(), &dirs[idx + 1..]);
            }
        }
    }
    match dirs.first() {
        Some(first) => (ClipType::Custom((*first).to_string()), &dirs[1..]),
        None => (ClipType::Custom(String::new()), dirs),
    }
}

fn event_asset_kind(filename: &str) -> Option<EventAssetKind> {
    match filename {
        "event.json" => Some(EventAssetKind::Json),
        "event.png" => Some(EventAssetKind::Png),
        "event.mp4" => Some(EventAssetKind::Mp4),
        _ => None,
    }
}

/// Validate and split `^YYYY-MM-DD_HH-MM-SS-<cameraRaw>\.mp4$`.
fn parse_clip_filename(filename: &str) -> Option<(String, String)> {
    let stem = filename.strip_suffix(".mp4")?;
    if stem.len() <= TIMESTAMP_LEN + 1 {
        return None;
    }
    let (timestamp_key, rest) = stem.split_at(TIMESTAMP_LEN);
    let camera_raw = rest.strip_prefix('-')?;
    if camera_raw.is_empty() {
        return None;
    }
    if chrono::NaiveDateTime::parse_from_str(timestamp_key, "%Y-%m-%d_%H-%M-%S").is_err() {
        return None;
    }
    Some((timestamp_key.to_string(), camera_raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recent_clip() {
        let entry = parse("RecentClips/2024-01-01_08-00-00-front.mp4").unwrap();
        match entry {
            ParsedEntry::Clip(clip) => {
                assert_eq!(clip.clip_type, ClipType::Recent);
                assert_eq!(clip.event_id, None);
                assert_eq!(clip.timestamp_key, "2024-01-01_08-00-00");
                assert_eq!(clip.camera, Camera::Front);
                assert_eq!(clip.camera_raw, "front");
            }
            _ => panic!("expected clip"),
        }
    }

    #[test]
    fn parses_sentry_clip_with_event_id() {
        let entry =
            parse("SentryClips/2024-01-01T08-00-00/2024-01-01_08-00-05-left_repeater.mp4")
                .unwrap();
        match entry {
            ParsedEntry::Clip(clip) => {
                assert_eq!(clip.clip_type, ClipType::Sentry);
                assert_eq!(clip.event_id.as_deref(), Some("2024-01-01T08-00-00"));
                assert_eq!(clip.camera, Camera::LeftRepeater);
            }
            _ => panic!("expected clip"),
        }
    }

    #[test]
    fn recognizes_event_sidecars() {
        let entry = parse("SavedClips/some-event/event.json").unwrap();
        assert!(matches!(
            entry,
            ParsedEntry::EventAsset(ParsedEventAsset {
                kind: EventAssetKind::Json,
                ..
            })
        ));
    }

    #[test]
    fn rejects_literal_event_mp4_as_video_clip() {
        let entry = parse("SavedClips/some-event/event.mp4").unwrap();
        assert!(matches!(
            entry,
            ParsedEntry::EventAsset(ParsedEventAsset {
                kind: EventAssetKind::Mp4,
                ..
            })
        ));
    }

    #[test]
    fn rejects_malformed_filename() {
        assert_eq!(
            parse("RecentClips/not-a-clip.mp4").unwrap_err(),
            RejectReason::NotAClipFilename
        );
    }

    #[test]
    fn custom_root_when_no_known_folder_present() {
        let entry = parse("MyDashcamBackup/2024-01-01_08-00-00-back.mp4").unwrap();
        match entry {
            ParsedEntry::Clip(clip) => {
                assert_eq!(clip.clip_type, ClipType::Custom("MyDashcamBackup".into()));
            }
            _ => panic!("expected clip"),
        }
    }

    #[test]
    fn render_round_trips_parse() {
        let original = "RecentClips/2024-01-01_08-00-00-left.mp4";
        let entry = parse(original).unwrap();
        match entry {
            ParsedEntry::Clip(clip) => {
                assert_eq!(render(&clip), original);
            }
            _ => panic!("expected clip"),
        }
    }
}
