use std::collections::BTreeSet;
use std::path::Path;

use td_export::{EngineConfig, ProcessSupervisor};
use td_models::{Camera, DayCollection, ExportRequest, LibraryIndex};
use tokio::sync::watch;
use tracing::{error, info};

use crate::cli::ExportArgs;
use crate::decoder::NullSeiDecoder;
use crate::exit_code;
use crate::scan;

async fn build_library_index(root: &Path) -> std::io::Result<LibraryIndex> {
    let files = scan::walk(root)?;
    let config = EngineConfig::from_env();
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    td_indexer::build_index(
        &files,
        config.indexer_batch_size,
        config.default_segment_duration_ms,
        |count| info!(count, "indexed files"),
        cancel_rx,
    )
    .await
    .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))
}

fn find_collection(index: &LibraryIndex, collection_id: &str) -> Option<DayCollection> {
    index
        .day_collections
        .iter()
        .find(|c| c.id == collection_id)
        .cloned()
}

pub async fn scan_root(root: &Path) -> i32 {
    let index = match build_library_index(root).await {
        Ok(index) => index,
        Err(err) => {
            error!(%err, "scan failed");
            return exit_code::IO_ERROR;
        }
    };
    let summary: Vec<_> = index
        .day_collections
        .iter()
        .map(|c| {
            serde_json::json!({
                "id": c.id,
                "day": c.day.to_string(),
                "clip_type": c.clip_type.label(),
                "groups": c.groups.len(),
                "duration_ms": c.duration_ms,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&summary).unwrap());
    exit_code::SUCCESS
}

pub async fn probe_encoders(ffmpeg_path: Option<&Path>) -> i32 {
    let resolved = match ffmpeg_path {
        Some(path) => path.to_path_buf(),
        None => match td_media::find_ffmpeg() {
            Ok(path) => path,
            Err(err) => {
                error!(%err, "ffmpeg not found");
                return exit_code::FFMPEG_UNAVAILABLE;
            }
        },
    };
    let config = EngineConfig::from_env();
    let probe_timeouts = td_media::ProbeTimeouts {
        help: config.probe_help_timeout,
        encode: config.probe_encode_timeout,
        gpu_name: config.probe_gpu_name_timeout,
    };
    let capability = td_media::probe_encoders(&resolved, probe_timeouts).await;
    println!("{}", serde_json::to_string_pretty(&capability).unwrap());
    exit_code::SUCCESS
}

pub async fn extract_telemetry(root: &Path, collection_id: &str, start_ms: i64, end_ms: i64) -> i32 {
    let index = match build_library_index(root).await {
        Ok(index) => index,
        Err(err) => {
            error!(%err, "scan failed");
            return exit_code::IO_ERROR;
        }
    };
    let Some(collection) = find_collection(&index, collection_id) else {
        error!(collection_id, "no such collection");
        return exit_code::INVALID_ARGS;
    };
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let segment_duration_ms = EngineConfig::from_env().default_segment_duration_ms;
    let outcome = match td_telemetry::extract_telemetry(
        &collection,
        start_ms,
        end_ms,
        segment_duration_ms,
        &NullSeiDecoder,
        cancel_rx,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(%err, "telemetry extraction failed");
            return exit_code::IO_ERROR;
        }
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "samples": outcome.samples,
            "gps_path": outcome.gps_path,
            "cancelled": outcome.cancelled,
        }))
        .unwrap()
    );
    exit_code::SUCCESS
}

pub async fn export(args: &ExportArgs) -> i32 {
    let index = match build_library_index(&args.root).await {
        Ok(index) => index,
        Err(err) => {
            error!(%err, "scan failed");
            return exit_code::IO_ERROR;
        }
    };
    let Some(collection) = find_collection(&index, &args.collection_id) else {
        error!(collection_id = %args.collection_id, "no such collection");
        return exit_code::INVALID_ARGS;
    };

    let cameras: BTreeSet<Camera> = args
        .cameras
        .iter()
        .map(|token| Camera::normalize(token))
        .filter(|camera| *camera != Camera::Unknown)
        .collect();
    if cameras.is_empty() {
        error!("no recognized cameras in selection");
        return exit_code::NO_VIDEO_FILES;
    }

    let mut request = ExportRequest::new(
        collection,
        args.start_ms,
        args.end_ms,
        cameras,
        args.output.clone(),
    )
    .with_quality(args.quality.into());
    request.mirror_cameras = args.mirror_cameras;
    request.use_metric = args.metric;
    request.language = args.language.clone();
    if args.dashboard {
        request = request.with_dashboard(
            td_models::DashboardStyle::Compact,
            td_models::DashboardSize::Medium,
        );
    }
    if args.minimap {
        request = request.with_minimap(td_models::MinimapRenderMode::Vector);
    }
    if args.timestamp {
        request = request.with_timestamp_caption();
    }
    if let Some(speed) = args.timelapse_speed {
        let Some(speed) = td_models::TimelapseSpeed::new(speed) else {
            error!(speed, "not an accepted timelapse multiplier");
            return exit_code::INVALID_ARGS;
        };
        request = request.with_timelapse(speed);
    }

    let mut config = EngineConfig::from_env();
    if let Some(path) = &args.ffmpeg_path {
        config.ffmpeg_path_override = Some(path.to_string_lossy().into_owned());
    }
    let supervisor = ProcessSupervisor::new(config);

    let work_dir = std::env::temp_dir().join(format!("td-export-{}", uuid::Uuid::new_v4()));
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let ctrl_c_cancel_tx = cancel_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("cancellation requested");
            let _ = ctrl_c_cancel_tx.send(true);
        }
    });

    let on_progress = |event: td_models::ProgressEvent| {
        println!("{}", serde_json::to_string(&event).unwrap());
    };

    let result = supervisor
        .run(request, &NullSeiDecoder, &work_dir, on_progress, cancel_rx)
        .await;
    let _ = tokio::fs::remove_dir_all(&work_dir).await;

    match result {
        Ok(_job) => exit_code::SUCCESS,
        Err(err) => {
            let kind = err.kind();
            error!(%err, ?kind, "export failed");
            exit_code::for_error_kind(kind)
        }
    }
}
