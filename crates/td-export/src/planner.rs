//! Export Planner: assembles the full FFmpeg invocation plus overlay sidecar artifacts (§4.5).

use std::path::PathBuf;

use td_models::{Camera, ExportRequest, EncoderCapability};
use td_media::FfmpegCommand;
use td_overlay::rasterize_blur_mask;
use tracing::warn;

use crate::encoder_select::{exceeds_all_hardware_limits, select_encoder, target_bitrate_kbps, EncoderChoice};
use crate::error::{PlannerError, PlannerResult};
use crate::resolution::{canvas_size, default_grid, is_front_only, tile_dimensions};

/// One real input file FFmpeg will open with `-i`, in the order it will be indexed.
#[derive(Debug, Clone)]
struct RealInput {
    path: PathBuf,
}

/// One segment slot for a single camera's concatenated stream: either a real trimmed clip or a
/// black-padding source of the same duration (§4.5.2).
enum CameraSegment {
    Real { input_index: usize, trim_start_sec: f64, trim_end_sec: f64 },
    Black { duration_sec: f64 },
}

/// Everything the Process Supervisor needs to run FFmpeg and burn in overlays.
pub struct ExportPlan {
    pub ffmpeg_command: FfmpegCommand,
    pub canvas: (u32, u32),
    pub encoder: EncoderChoice,
    pub bitrate_kbps: u64,
    pub duration_ms: u64,
    /// `(filename, png_bytes)` blur masks to materialize alongside the overlay files.
    pub blur_mask_files: Vec<(String, Vec<u8>)>,
    pub warnings: Vec<String>,
}

/// Build the full export plan. `ffmpeg_path` should already be resolved (the Process Supervisor
/// owns discovery and the one-shot encoder probe); `segment_duration_ms` is the nominal clip
/// length sourced from `EngineConfig::default_segment_duration_ms` (§1.3); `work_dir` is where
/// overlay/mask sidecars are staged.
pub fn plan_export(
    request: &ExportRequest,
    capability: &EncoderCapability,
    segment_duration_ms: i64,
    work_dir: &std::path::Path,
) -> PlannerResult<ExportPlan> {
    if request.start_ms >= request.end_ms {
        return Err(PlannerError::EmptySelection);
    }

    let selected: Vec<Camera> = Camera::ALL
        .iter()
        .copied()
        .filter(|c| request.cameras.contains(c))
        .collect();
    if selected.is_empty() {
        return Err(PlannerError::EmptySelection);
    }

    let front_only = is_front_only(&selected);
    let tile = tile_dimensions(request.quality, front_only);
    let grid = request
        .layout_data
        .as_ref()
        .map(|layout| (layout.cols, layout.rows))
        .unwrap_or_else(|| default_grid(selected.len()));
    let order: Vec<Camera> = request
        .layout_data
        .as_ref()
        .map(|layout| layout.order.clone())
        .unwrap_or_else(|| selected.clone());
    let canvas = canvas_size(tile, grid);

    let mut warnings = Vec::new();
    let mut real_inputs: Vec<RealInput> = Vec::new();
    let mut per_camera_segments: Vec<(Camera, Vec<CameraSegment>)> = Vec::new();
    let mut any_segment_in_range = false;

    for camera in &order {
        let mut segments = Vec::new();
        for (group, &group_start_ms) in request.collection.groups.iter().zip(&request.collection.segment_starts_ms) {
            let group_end_ms = group_start_ms + segment_duration_ms;
            let overlap_start = group_start_ms.max(request.start_ms);
            let overlap_end = group_end_ms.min(request.end_ms);
            if overlap_end <= overlap_start {
                continue;
            }
            any_segment_in_range = true;
            let trim_start_sec = (overlap_start - group_start_ms) as f64 / 1000.0;
            let trim_end_sec = (overlap_end - group_start_ms) as f64 / 1000.0;
            let duration_sec = trim_end_sec - trim_start_sec;

            match group.files_by_camera.get(camera) {
                Some(clip) => {
                    let input_index = real_inputs.len();
                    real_inputs.push(RealInput { path: clip.file.path.clone() });
                    segments.push(CameraSegment::Real {
                        input_index,
                        trim_start_sec,
                        trim_end_sec,
                    });
                }
                None => {
                    segments.push(CameraSegment::Black { duration_sec });
                }
            }
        }
        per_camera_segments.push((*camera, segments));
    }

    if !any_segment_in_range {
        return Err(PlannerError::EmptySelection);
    }

    let mut filter_parts: Vec<String> = Vec::new();
    let mut camera_labels: Vec<(Camera, String)> = Vec::new();

    for (camera, segments) in &per_camera_segments {
        let mut segment_labels = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            let label = format!("cam{}seg{i}", camera.canonical_token());
            match segment {
                CameraSegment::Real { input_index, trim_start_sec, trim_end_sec } => {
                    filter_parts.push(format!(
                        "[{input_index}:v]trim=start={trim_start_sec:.3}:end={trim_end_sec:.3},setpts=PTS-STARTPTS,scale={}:{}[{label}]",
                        tile.0, tile.1
                    ));
                }
                CameraSegment::Black { duration_sec } => {
                    filter_parts.push(format!(
                        "color=c=black:s={}x{}:d={duration_sec:.3}:r=36[{label}]",
                        tile.0, tile.1
                    ));
                }
            }
            segment_labels.push(label);
        }

        let concatenated = format!("cam{}", camera.canonical_token());
        if segment_labels.len() == 1 {
            filter_parts.push(format!("[{}]null[{concatenated}]", segment_labels[0]));
        } else {
            let inputs: String = segment_labels.iter().map(|l| format!("[{l}]")).collect();
            filter_parts.push(format!("{inputs}concat=n={}:v=1:a=0[{concatenated}]", segment_labels.len()));
        }

        let mirrored = if request.mirror_cameras && camera.is_mirrorable() {
            let flipped = format!("{concatenated}flip");
            filter_parts.push(format!("[{concatenated}]hflip[{flipped}]"));
            flipped
        } else {
            concatenated
        };

        camera_labels.push((*camera, mirrored));
    }

    // Blur zones: only those targeting a selected camera are applied; the rest are dropped with
    // a warning (§4.5.4).
    let mut blur_mask_files = Vec::new();
    let mut mask_input_index_base = real_inputs.len();
    let mut camera_blur_masks: std::collections::HashMap<Camera, Vec<usize>> = std::collections::HashMap::new();
    for (i, zone) in request.blur_zones.iter().enumerate() {
        if !selected.contains(&zone.camera) {
            warn!(camera = %zone.camera, "blur zone targets a camera not in the selection; ignoring");
            continue;
        }
        let mask_bytes = rasterize_blur_mask(zone)?;
        let filename = format!("blur_{i}.png");
        blur_mask_files.push((filename.clone(), mask_bytes));
        real_inputs.push(RealInput { path: work_dir.join(&filename) });
        let input_index = mask_input_index_base;
        mask_input_index_base += 1;
        camera_blur_masks.entry(zone.camera).or_default().push(input_index);
    }

    for (camera, label) in camera_labels.iter_mut() {
        if let Some(mask_indices) = camera_blur_masks.get(camera) {
            for mask_index in mask_indices {
                let blurred = format!("{label}blur");
                let masked = format!("{label}masked");
                filter_parts.push(format!("[{label}]boxblur=20:2[{blurred}]"));
                filter_parts.push(format!(
                    "[{label}][{blurred}][{mask_index}:v]maskedmerge[{masked}]"
                ));
                *label = masked;
            }
        }
    }

    // Grid assembly (row-major, §4.5.1). All tiles share one size, so xstack offsets are
    // multiples of the tile dimensions.
    let (cols, rows) = grid;
    let mut layout_cells = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            layout_cells.push((col * tile.0, row * tile.1));
        }
    }
    let layout = layout_cells
        .iter()
        .take(camera_labels.len())
        .map(|(x, y)| format!("{x}_{y}"))
        .collect::<Vec<_>>()
        .join("|");
    let stack_inputs: String = camera_labels.iter().map(|(_, l)| format!("[{l}]")).collect();
    filter_parts.push(format!(
        "{stack_inputs}xstack=inputs={}:layout={layout}[grid]",
        camera_labels.len()
    ));

    let mut current_label = "grid".to_string();
    let requested_duration_ms = (request.end_ms - request.start_ms) as u64;
    let duration_ms = if request.enable_timelapse {
        let speed = request.timelapse_speed.value();
        filter_parts.push(format!("[{current_label}]setpts=(1/{speed})*PTS[timelapsed]"));
        current_label = "timelapsed".to_string();
        (requested_duration_ms as f64 / speed).round() as u64
    } else {
        requested_duration_ms
    };

    // Overlay *content* (the actual ASS documents) is compiled by the Process Supervisor once
    // telemetry has been extracted (§4.6) — this stage only reserves their well-known filenames
    // in the filter graph, since subtitle burn-in must be the last step before encoding.
    if request.include_dashboard {
        filter_parts.push(format!(
            "[{current_label}]subtitles={}[dashboarded]",
            escape_filter_path(&work_dir.join("dashboard.ass"))
        ));
        current_label = "dashboarded".to_string();
    }
    if request.include_minimap {
        filter_parts.push(format!(
            "[{current_label}]subtitles={}[minimapped]",
            escape_filter_path(&work_dir.join("minimap.ass"))
        ));
        current_label = "minimapped".to_string();
    }
    if request.include_timestamp {
        filter_parts.push(format!(
            "[{current_label}]subtitles={}[timestamped]",
            escape_filter_path(&work_dir.join("timestamp.ass"))
        ));
        current_label = "timestamped".to_string();
    }

    let mut encoder = select_encoder(canvas, capability);
    let mut effective_canvas = canvas;
    let mut effective_tile = tile;
    let mut effective_quality = request.quality;
    if exceeds_all_hardware_limits(canvas, capability) {
        // Hardware exists but neither codec fit this canvas: downgrade quality one tier at a
        // time until something fits, rather than silently truncating the frame (§7).
        for lower_quality in lower_quality_tiers(request.quality) {
            let candidate_tile = tile_dimensions(lower_quality, front_only);
            let candidate_canvas = canvas_size(candidate_tile, grid);
            let candidate = select_encoder(candidate_canvas, capability);
            if candidate != EncoderChoice::Cpu {
                warn!(
                    from = ?request.quality,
                    to = ?lower_quality,
                    "canvas exceeded the encoder limit; downgrading quality"
                );
                warnings.push(format!(
                    "canvas {}x{} exceeded the encoder limit; downgraded quality to fit",
                    canvas.0, canvas.1
                ));
                encoder = candidate;
                effective_canvas = candidate_canvas;
                effective_tile = candidate_tile;
                effective_quality = lower_quality;
                break;
            }
        }
    }
    let _ = effective_tile;

    let bitrate_kbps = target_bitrate_kbps(effective_canvas, effective_quality);

    let filter_complex = filter_parts.join(";");
    let mut command = FfmpegCommand::new(&request.output_path)
        .add_inputs(real_inputs.iter().map(|i| i.path.clone()))
        .filter_complex(filter_complex)
        .map(format!("[{current_label}]"))
        .video_codec(encoder.codec_arg())
        .output_arg("-b:v")
        .output_arg(format!("{bitrate_kbps}k"))
        .output_arg("-an")
        .pix_fmt("yuv420p");

    if let Some(ffmpeg_path) = capability.ffmpeg_path.to_str() {
        command = command.with_ffmpeg_path(ffmpeg_path.into());
    }

    Ok(ExportPlan {
        ffmpeg_command: command,
        canvas: effective_canvas,
        encoder,
        bitrate_kbps,
        duration_ms,
        blur_mask_files,
        warnings,
    })
}

fn lower_quality_tiers(from: td_models::Quality) -> Vec<td_models::Quality> {
    use td_models::Quality::*;
    match from {
        Max => vec![High, Medium, Mobile],
        High => vec![Medium, Mobile],
        Medium => vec![Mobile],
        Mobile => vec![],
    }
}

fn escape_filter_path(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace(':', "\\:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use td_models::{ClipGroup, ClipType, DayCollection, EncoderCapability, ExportRequest, FileDescriptor, FileIdentity};
    use chrono::NaiveDate;

    fn capability() -> EncoderCapability {
        EncoderCapability::software_only(PathBuf::from("/usr/bin/ffmpeg"))
    }

    fn collection_with_front_segment() -> DayCollection {
        let mut files_by_camera = std::collections::BTreeMap::new();
        files_by_camera.insert(
            Camera::Front,
            td_models::ClipFile {
                clip_type: ClipType::Recent,
                event_id: None,
                timestamp_key: "2024-01-01_08-00-00".into(),
                camera: Camera::Front,
                camera_raw: "front".into(),
                file: FileDescriptor {
                    path: "front.mp4".into(),
                    rel_path: "front.mp4".into(),
                    size: 1,
                    identity: FileIdentity::from_size_and_mtime(1, 0),
                },
            },
        );
        let group = ClipGroup {
            id: "g".into(),
            clip_type: ClipType::Recent,
            event_id: None,
            timestamp_key: "2024-01-01_08-00-00".into(),
            files_by_camera,
            event_meta: None,
            event_json: None,
            event_png: None,
            event_mp4: None,
        };
        DayCollection {
            id: "c".into(),
            day: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            clip_type: ClipType::Recent,
            groups: vec![group],
            segment_starts_ms: vec![0],
            duration_ms: 60_000,
            anchor_ms: None,
            anchor_group_id: None,
        }
    }

    #[test]
    fn empty_range_is_rejected() {
        let mut cameras = BTreeSet::new();
        cameras.insert(Camera::Front);
        let request = ExportRequest::new(
            collection_with_front_segment(),
            1000,
            1000,
            cameras,
            "/tmp/out.mp4".into(),
        );
        let result = plan_export(&request, &capability(), 60_000, std::path::Path::new("/tmp"));
        assert!(matches!(result, Err(PlannerError::EmptySelection)));
    }

    #[test]
    fn single_front_camera_plans_successfully() {
        let mut cameras = BTreeSet::new();
        cameras.insert(Camera::Front);
        let request = ExportRequest::new(
            collection_with_front_segment(),
            0,
            60_000,
            cameras,
            "/tmp/out.mp4".into(),
        );
        let plan = plan_export(&request, &capability(), 60_000, std::path::Path::new("/tmp")).unwrap();
        assert_eq!(plan.canvas, (1448, 938));
        assert_eq!(plan.encoder, EncoderChoice::Cpu);
    }
}
