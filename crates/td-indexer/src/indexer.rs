//! Builds a queryable in-memory index of a scan (§4.2).

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use td_models::{ClipFile, ClipGroup, ClipType, DayCollection, EventMeta, FileDescriptor, LibraryIndex};
use tokio::sync::watch;

use crate::error::IndexerResult;
use crate::path_parser::{self, EventAssetKind, ParsedClip, ParsedEntry};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct GroupKey {
    clip_type: String,
    event_id: Option<String>,
    timestamp_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct EventKey {
    clip_type: String,
    event_id: String,
}

/// Build the full library index from a flat list of scanned files.
///
/// `on_progress` is invoked every `batch_size` files (sourced from
/// `EngineConfig::indexer_batch_size`, §1.3) with the running count. `cancel` is checked between
/// batches; if set, indexing stops and the partial index built so far is returned (never an
/// error — a partial index is always usable). `segment_duration_ms` (sourced from
/// `EngineConfig::default_segment_duration_ms`, §1.3) is the nominal clip length used to derive a
/// collection's total duration when its last segment has no authoritative end.
pub async fn build_index(
    files: &[FileDescriptor],
    batch_size: usize,
    segment_duration_ms: i64,
    mut on_progress: impl FnMut(usize),
    mut cancel: watch::Receiver<bool>,
) -> IndexerResult<LibraryIndex> {
    let batch_size = batch_size.max(1);
    let mut groups: BTreeMap<GroupKey, ClipGroup> = BTreeMap::new();
    let mut event_json_assets: BTreeMap<EventKey, FileDescriptor> = BTreeMap::new();
    let mut event_png_assets: BTreeMap<EventKey, FileDescriptor> = BTreeMap::new();
    let mut event_mp4_assets: BTreeMap<EventKey, FileDescriptor> = BTreeMap::new();

    for (idx, file) in files.iter().enumerate() {
        match path_parser::parse(&file.rel_path) {
            Ok(ParsedEntry::Clip(clip)) => insert_clip(&mut groups, clip, file.clone()),
            Ok(ParsedEntry::EventAsset(asset)) => {
                if let Some(event_id) = asset.event_id {
                    let key = EventKey {
                        clip_type: asset.clip_type.label().to_string(),
                        event_id,
                    };
                    match asset.kind {
                        EventAssetKind::Json => {
                            event_json_assets.insert(key, file.clone());
                        }
                        EventAssetKind::Png => {
                            event_png_assets.insert(key, file.clone());
                        }
                        EventAssetKind::Mp4 => {
                            event_mp4_assets.insert(key, file.clone());
                        }
                    }
                }
            }
            Err(_) => {
                tracing::trace!(path = %file.rel_path, "skipping non-clip file");
            }
        }

        if (idx + 1) % batch_size == 0 {
            on_progress(idx + 1);
            if *cancel.borrow() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }
    on_progress(files.len());

    for group in groups.values_mut() {
        if let Some(event_id) = &group.event_id {
            let key = EventKey {
                clip_type: group.clip_type.label().to_string(),
                event_id: event_id.clone(),
            };
            group.event_json = event_json_assets.get(&key).cloned();
            group.event_png = event_png_assets.get(&key).cloned();
            group.event_mp4 = event_mp4_assets.get(&key).cloned();
            if let Some(sidecar) = &group.event_json {
                group.event_meta = read_event_meta(sidecar).await;
            }
        }
    }

    let mut ordered_groups: Vec<ClipGroup> = groups.into_values().collect();
    ordered_groups.sort_by(|a, b| a.timestamp_key.cmp(&b.timestamp_key));

    let day_collections = build_day_collections(&ordered_groups, segment_duration_ms);

    Ok(LibraryIndex {
        groups: ordered_groups,
        day_collections,
    })
}

fn insert_clip(groups: &mut BTreeMap<GroupKey, ClipGroup>, clip: ParsedClip, file: FileDescriptor) {
    let key = GroupKey {
        clip_type: clip.clip_type.label().to_string(),
        event_id: clip.event_id.clone(),
        timestamp_key: clip.timestamp_key.clone(),
    };
    let group = groups.entry(key).or_insert_with(|| ClipGroup {
        id: ClipGroup::make_id(&clip.clip_type, clip.event_id.as_deref(), &clip.timestamp_key),
        clip_type: clip.clip_type.clone(),
        event_id: clip.event_id.clone(),
        timestamp_key: clip.timestamp_key.clone(),
        files_by_camera: Default::default(),
        event_meta: None,
        event_json: None,
        event_png: None,
        event_mp4: None,
    });
    group.files_by_camera.insert(
        clip.camera,
        ClipFile {
            clip_type: clip.clip_type,
            event_id: clip.event_id,
            timestamp_key: clip.timestamp_key,
            camera: clip.camera,
            camera_raw: clip.camera_raw,
            file,
        },
    );
}

async fn read_event_meta(sidecar: &FileDescriptor) -> Option<EventMeta> {
    match tokio::fs::read(&sidecar.path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).ok(),
        Err(err) => {
            tracing::warn!(path = %sidecar.path.display(), error = %err, "failed to read event.json");
            None
        }
    }
}

/// Parse `timestampKey` as local civil time; `None` on malformed input (§4.2).
fn parse_wall_clock(timestamp_key: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(timestamp_key, "%Y-%m-%d_%H-%M-%S").ok()
}

fn day_prefix(timestamp_key: &str) -> &str {
    timestamp_key.get(0..10).unwrap_or(timestamp_key)
}

fn build_day_collections(groups: &[ClipGroup], segment_duration_ms: i64) -> Vec<DayCollection> {
    let mut buckets: BTreeMap<(String, String, Option<String>), Vec<usize>> = BTreeMap::new();

    for (idx, group) in groups.iter().enumerate() {
        let day = day_prefix(&group.timestamp_key).to_string();
        let roll_up_key = match &group.clip_type {
            ClipType::Recent => (day, "recent".to_string(), None),
            ClipType::Custom(tag) => (day, format!("custom:{tag}"), None),
            ClipType::Sentry => (day, "sentry".to_string(), group.event_id.clone()),
            ClipType::Saved => (day, "saved".to_string(), group.event_id.clone()),
        };
        buckets.entry(roll_up_key).or_default().push(idx);
    }

    let mut collections = Vec::with_capacity(buckets.len());
    for ((day, _bucket, _event), indices) in buckets {
        let members: Vec<&ClipGroup> = indices.iter().map(|&i| &groups[i]).collect();
        let Some(first) = members.first() else {
            continue;
        };
        let base_wall_clock = parse_wall_clock(&first.timestamp_key);

        let mut segment_starts_ms = Vec::with_capacity(members.len());
        for member in &members {
            let offset = match (base_wall_clock, parse_wall_clock(&member.timestamp_key)) {
                (Some(base), Some(this)) => (this - base).num_milliseconds().max(0),
                _ => 0,
            };
            segment_starts_ms.push(offset);
        }

        let duration_ms = segment_starts_ms
            .last()
            .copied()
            .unwrap_or(0)
            + segment_duration_ms;

        let parsed_day = chrono::NaiveDate::parse_from_str(&day, "%Y-%m-%d")
            .unwrap_or_else(|_| chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());

        collections.push(DayCollection {
            id: DayCollection::make_id(&first.clip_type, parsed_day, &first.timestamp_key),
            day: parsed_day,
            clip_type: first.clip_type.clone(),
            groups: members.into_iter().cloned().collect(),
            segment_starts_ms,
            duration_ms,
            anchor_ms: None,
            anchor_group_id: None,
        });
    }

    collections.sort_by(|a, b| a.day.cmp(&b.day).then(a.id.cmp(&b.id)));
    collections
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_models::{Camera, FileIdentity};

    fn file(rel_path: &str) -> FileDescriptor {
        FileDescriptor {
            path: rel_path.into(),
            rel_path: rel_path.to_string(),
            size: 1,
            identity: FileIdentity::from_size_and_mtime(1, 0),
        }
    }

    #[tokio::test]
    async fn groups_same_moment_across_cameras() {
        let files = vec![
            file("RecentClips/2024-01-01_08-00-00-front.mp4"),
            file("RecentClips/2024-01-01_08-00-00-back.mp4"),
            file("RecentClips/not-a-clip.txt"),
        ];
        let (_tx, rx) = watch::channel(false);
        let index = build_index(&files, 200, 60_000, |_| {}, rx).await.unwrap();
        assert_eq!(index.groups.len(), 1);
        assert_eq!(index.groups[0].files_by_camera.len(), 2);
        assert!(index.groups[0].files_by_camera.contains_key(&Camera::Front));
    }

    #[tokio::test]
    async fn segment_starts_begin_at_zero_and_are_monotonic() {
        let files = vec![
            file("RecentClips/2024-01-01_08-00-00-front.mp4"),
            file("RecentClips/2024-01-01_08-01-00-front.mp4"),
        ];
        let (_tx, rx) = watch::channel(false);
        let index = build_index(&files, 200, 60_000, |_| {}, rx).await.unwrap();
        assert_eq!(index.day_collections.len(), 1);
        let collection = &index.day_collections[0];
        assert!(collection.invariants_hold());
        assert_eq!(collection.segment_starts_ms, vec![0, 60_000]);
    }

    #[tokio::test]
    async fn sentry_events_get_separate_collections() {
        let files = vec![
            file("SentryClips/evt-a/2024-01-01_08-00-00-front.mp4"),
            file("SentryClips/evt-b/2024-01-01_09-00-00-front.mp4"),
        ];
        let (_tx, rx) = watch::channel(false);
        let index = build_index(&files, 200, 60_000, |_| {}, rx).await.unwrap();
        assert_eq!(index.day_collections.len(), 2);
    }
}
