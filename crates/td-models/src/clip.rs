//! Clip file, clip group, and event-sidecar metadata.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::Camera;

/// A stand-in for content identity without hashing the whole file: `(size, mtime)` is cheap to
/// compute while scanning a tree and is stable across re-scans of unmodified footage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileIdentity(pub String);

impl FileIdentity {
    pub fn from_size_and_mtime(size: u64, modified_unix_ms: i64) -> Self {
        Self(format!("{size}:{modified_unix_ms}"))
    }
}

/// A file discovered by the folder scanner, immutable for the lifetime of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: PathBuf,
    /// Forward-slash-normalized path relative to the scanned root.
    pub rel_path: String,
    pub size: u64,
    pub identity: FileIdentity,
}

impl FileDescriptor {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// The clip-type bucket a `ClipFile` belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipType {
    Recent,
    Sentry,
    Saved,
    /// Any top-level folder that isn't `RecentClips`/`SentryClips`/`SavedClips`; the string is
    /// the folder name used as the tag.
    Custom(String),
}

impl ClipType {
    pub fn label(&self) -> &str {
        match self {
            ClipType::Recent => "RecentClips",
            ClipType::Sentry => "SentryClips",
            ClipType::Saved => "SavedClips",
            ClipType::Custom(tag) => tag,
        }
    }
}

impl std::fmt::Display for ClipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Loosely-typed contents of a Sentry/Saved event's `event.json` sidecar. Unknown fields are
/// preserved in `extra` rather than rejected, since Tesla firmware has added fields over time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMeta {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub est_lat: Option<f64>,
    #[serde(default)]
    pub est_lon: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub camera: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single per-camera MP4, located and classified by the Path Parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipFile {
    pub clip_type: ClipType,
    pub event_id: Option<String>,
    /// `YYYY-MM-DD_HH-MM-SS`, taken verbatim from the filename.
    pub timestamp_key: String,
    pub camera: Camera,
    /// The raw filename camera token, kept for bit-exact path round-trip (see
    /// [`Camera::canonical_token`] for why the normalized enum alone isn't enough).
    pub camera_raw: String,
    pub file: FileDescriptor,
}

/// A "moment": all per-camera files sharing a `(clipType, eventId, timestampKey)` tuple, plus any
/// event sidecar assets attached from the same event folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipGroup {
    pub id: String,
    pub clip_type: ClipType,
    pub event_id: Option<String>,
    pub timestamp_key: String,
    pub files_by_camera: BTreeMap<Camera, ClipFile>,
    pub event_meta: Option<EventMeta>,
    pub event_json: Option<FileDescriptor>,
    pub event_png: Option<FileDescriptor>,
    pub event_mp4: Option<FileDescriptor>,
}

impl ClipGroup {
    /// Deterministic group id: same input files always yield the same id (§8 index determinism).
    pub fn make_id(clip_type: &ClipType, event_id: Option<&str>, timestamp_key: &str) -> String {
        format!(
            "{}:{}:{}",
            clip_type.label(),
            event_id.unwrap_or(""),
            timestamp_key
        )
    }

    /// Prefer the front camera file; fall back to any camera (SEI telemetry is replicated
    /// across cameras within a moment, per §4.3 step 2).
    pub fn preferred_telemetry_source(&self) -> Option<&ClipFile> {
        self.files_by_camera
            .get(&Camera::Front)
            .or_else(|| self.files_by_camera.values().next())
    }
}

/// Decode a `rel_path`'s directory separators into forward slashes, as the Path Parser expects.
pub fn normalize_separators(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_is_deterministic() {
        let a = ClipGroup::make_id(&ClipType::Sentry, Some("2024-01-01"), "2024-01-01_08-00-00");
        let b = ClipGroup::make_id(&ClipType::Sentry, Some("2024-01-01"), "2024-01-01_08-00-00");
        assert_eq!(a, b);
    }

    #[test]
    fn preferred_source_falls_back_to_any_camera() {
        let mut files_by_camera = BTreeMap::new();
        files_by_camera.insert(
            Camera::Back,
            ClipFile {
                clip_type: ClipType::Recent,
                event_id: None,
                timestamp_key: "2024-01-01_08-00-00".into(),
                camera: Camera::Back,
                camera_raw: "back".into(),
                file: FileDescriptor {
                    path: "back.mp4".into(),
                    rel_path: "back.mp4".into(),
                    size: 1,
                    identity: FileIdentity::from_size_and_mtime(1, 0),
                },
            },
        );
        let group = ClipGroup {
            id: "x".into(),
            clip_type: ClipType::Recent,
            event_id: None,
            timestamp_key: "2024-01-01_08-00-00".into(),
            files_by_camera,
            event_meta: None,
            event_json: None,
            event_png: None,
            event_mp4: None,
        };
        assert_eq!(group.preferred_telemetry_source().unwrap().camera, Camera::Back);
    }
}
