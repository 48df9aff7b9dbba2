//! Process Supervisor: owns one job's child FFmpeg process, its progress stream, and cancellation
//! (§4.6). It also drives the two upstream steps an export depends on — telemetry extraction and
//! overlay compilation — so `run` is the full `Planning -> Extracting -> Rendering -> Succeeded`
//! state machine, not just the FFmpeg leg.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use td_media::{FfmpegProgress, FfmpegRunner};
use td_models::{
    ErrorKind, ExportJob, ExportRequest, JobId, JobState, Message, ProgressEvent, ProgressKind,
};
use td_overlay::{
    compile_dashboard, compile_minimap, compile_timestamp, BuiltinTranslator, DashboardOptions,
    MinimapOptions, TimestampOptions,
};
use td_telemetry::{extract_telemetry, ExtractionOutcome, SeiDecoder};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{SupervisorError, SupervisorResult};
use crate::planner::{plan_export, ExportPlan};

/// Sequences and forwards [`ProgressEvent`]s for one job to the caller's callback.
struct Emitter<F: Fn(ProgressEvent) + Send + Sync> {
    job_id: JobId,
    seq: AtomicU64,
    callback: F,
}

impl<F: Fn(ProgressEvent) + Send + Sync> Emitter<F> {
    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    fn emit(&self, kind: ProgressKind, percent: f32, message: Message) {
        let event = ProgressEvent::new(self.job_id, self.next_seq(), kind, percent, message);
        (self.callback)(event);
    }

    fn emit_complete(&self) {
        (self.callback)(ProgressEvent::complete(self.job_id, self.next_seq()));
    }

    fn emit_failed(&self, error: ErrorKind, message: Message) {
        (self.callback)(ProgressEvent::failed(self.job_id, self.next_seq(), error, message));
    }
}

/// Runs a single export job end to end, emitting [`ProgressEvent`]s through `on_progress`.
pub struct ProcessSupervisor {
    config: EngineConfig,
}

impl ProcessSupervisor {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    fn resolve_ffmpeg_path(&self) -> Result<PathBuf, td_media::MediaError> {
        match &self.config.ffmpeg_path_override {
            Some(path) => Ok(PathBuf::from(path)),
            None => td_media::find_ffmpeg(),
        }
    }

    /// Drive `request` through its full lifecycle. `decoder` is the caller's opaque SEI decoder
    /// (§4.3); `work_dir` is a caller-owned scratch directory for overlay/mask sidecars, deleted
    /// by the caller once the job reaches a terminal state.
    pub async fn run<F>(
        &self,
        request: ExportRequest,
        decoder: &dyn SeiDecoder,
        work_dir: &Path,
        on_progress: F,
        mut cancel_rx: watch::Receiver<bool>,
    ) -> SupervisorResult<ExportJob>
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        let mut job = ExportJob::new(request.output_path.clone());
        let emitter = Arc::new(Emitter {
            job_id: job.id,
            seq: AtomicU64::new(0),
            callback: on_progress,
        });
        emitter.emit(ProgressKind::Planning, 0.0, Message::plain("planning export"));

        let ffmpeg_path = match self.resolve_ffmpeg_path() {
            Ok(path) => path,
            Err(source) => return fail_job(job, &emitter, SupervisorError::Media(source)),
        };
        let probe_timeouts = td_media::ProbeTimeouts {
            help: self.config.probe_help_timeout,
            encode: self.config.probe_encode_timeout,
            gpu_name: self.config.probe_gpu_name_timeout,
        };
        let capability = td_media::probe_encoders(&ffmpeg_path, probe_timeouts).await;

        let plan = match plan_export(&request, &capability, self.config.default_segment_duration_ms, work_dir) {
            Ok(plan) => plan,
            Err(source) => return fail_job(job, &emitter, source.into()),
        };

        job.advance(JobState::Extracting, "extracting telemetry");
        emitter.emit(ProgressKind::Extracting, 0.0, Message::plain("extracting telemetry"));

        let outcome = match extract_telemetry(
            &request.collection,
            request.start_ms,
            request.end_ms,
            self.config.default_segment_duration_ms,
            decoder,
            cancel_rx.clone(),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(source) => return fail_job(job, &emitter, source.into()),
        };
        if outcome.cancelled || *cancel_rx.borrow() {
            return cancel_job(job, &emitter, work_dir).await;
        }
        if outcome.samples.is_empty() {
            warn!(job_id = %job.id, "no telemetry extracted; disabling dashboard and minimap");
        }

        if let Err(source) = write_overlays(&request, &plan, &outcome, work_dir).await {
            return fail_job(job, &emitter, source);
        }

        job.advance(JobState::Rendering, "rendering");
        emitter.emit(ProgressKind::Rendering, 0.0, Message::plain("rendering"));

        let runner = FfmpegRunner::new()
            .with_cancel(cancel_rx.clone())
            .with_termination_grace(self.config.graceful_termination_grace);
        let start_ms = request.start_ms;
        let end_ms = request.end_ms;
        let forwarder_emitter = Arc::clone(&emitter);
        let forwarder = move |progress: FfmpegProgress| {
            let percent = progress.percentage(start_ms, end_ms);
            forwarder_emitter.emit(
                ProgressKind::Rendering,
                percent,
                Message::plain(format!("{percent:.1}%")),
            );
        };

        let result = runner.run(&plan.ffmpeg_command, forwarder).await;

        if *cancel_rx.borrow_and_update() {
            return cancel_job(job, &emitter, work_dir).await;
        }

        match result {
            Ok(()) => {
                job.advance(JobState::Succeeded, "succeeded");
                job.progress_pct = 100.0;
                emitter.emit_complete();
                info!(job_id = %job.id, "export succeeded");
                Ok(job)
            }
            Err(source) => fail_job(job, &emitter, source.into()),
        }
    }
}

async fn write_overlays(
    request: &ExportRequest,
    plan: &ExportPlan,
    outcome: &ExtractionOutcome,
    work_dir: &Path,
) -> SupervisorResult<()> {
    tokio::fs::create_dir_all(work_dir).await?;

    let have_telemetry = !outcome.samples.is_empty();
    if request.include_dashboard && have_telemetry {
        let options = DashboardOptions {
            style: request.dashboard_style,
            size: request.dashboard_size,
            position: request.dashboard_position,
            use_metric: request.use_metric,
            language: request.language.clone(),
            canvas_w: plan.canvas.0,
            canvas_h: plan.canvas.1,
        };
        let doc = compile_dashboard(&outcome.samples, plan.duration_ms, &options, &BuiltinTranslator);
        tokio::fs::write(work_dir.join("dashboard.ass"), doc.render()).await?;
    }
    if request.include_minimap && have_telemetry {
        let options = MinimapOptions {
            size: request.minimap_size,
            position: request.minimap_position,
            dark_mode: request.minimap_dark_mode,
            canvas_w: plan.canvas.0,
            canvas_h: plan.canvas.1,
        };
        let doc = compile_minimap(&outcome.gps_path, plan.duration_ms, &options);
        tokio::fs::write(work_dir.join("minimap.ass"), doc.render()).await?;
    }
    if request.include_timestamp {
        let options = TimestampOptions {
            date_format: request.timestamp_date_format,
            time_format: request.timestamp_time_format,
            canvas_w: plan.canvas.0,
            canvas_h: plan.canvas.1,
        };
        let wall_clock_start = request.collection.day.and_hms_opt(0, 0, 0).unwrap()
            + chrono::Duration::milliseconds(request.start_ms);
        let doc = compile_timestamp(wall_clock_start, plan.duration_ms, &options);
        tokio::fs::write(work_dir.join("timestamp.ass"), doc.render()).await?;
    }
    for (filename, bytes) in &plan.blur_mask_files {
        tokio::fs::write(work_dir.join(filename), bytes).await?;
    }
    Ok(())
}

fn fail_job<F: Fn(ProgressEvent) + Send + Sync>(
    mut job: ExportJob,
    emitter: &Emitter<F>,
    source: SupervisorError,
) -> SupervisorResult<ExportJob> {
    job.advance(JobState::Failed, "failed");
    emitter.emit_failed(source.kind(), Message::plain(source.to_string()));
    Err(source)
}

async fn cancel_job<F: Fn(ProgressEvent) + Send + Sync>(
    mut job: ExportJob,
    emitter: &Emitter<F>,
    work_dir: &Path,
) -> SupervisorResult<ExportJob> {
    job.advance(JobState::Cancelled, "cancelled");
    if job.output_path.exists() {
        let _ = tokio::fs::remove_file(&job.output_path).await;
    }
    let _ = remove_overlay_sidecars(work_dir).await;
    emitter.emit_failed(ErrorKind::Cancelled, Message::plain("cancelled"));
    Err(SupervisorError::Cancelled)
}

async fn remove_overlay_sidecars(work_dir: &Path) -> std::io::Result<()> {
    for name in ["dashboard.ass", "minimap.ass", "timestamp.ass"] {
        let path: PathBuf = work_dir.join(name);
        if path.exists() {
            tokio::fs::remove_file(path).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_constructs_supervisor() {
        let _supervisor = ProcessSupervisor::new(EngineConfig::default());
    }
}
