//! Export job identity and state machine (§4.6, §5: single writer per job).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque job identifier, stable for the job's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The export job's lifecycle. `Cancelled` is reachable from any non-terminal state; `Succeeded`,
/// `Failed` and `Cancelled` are terminal (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Planning,
    Extracting,
    Rendering,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }

    /// `true` iff advancing from `self` to `next` is a legal transition.
    pub fn can_advance_to(&self, next: JobState) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobState::Cancelled {
            return true;
        }
        matches!(
            (self, next),
            (JobState::Planning, JobState::Extracting)
                | (JobState::Planning, JobState::Rendering)
                | (JobState::Extracting, JobState::Rendering)
                | (JobState::Rendering, JobState::Succeeded)
                | (JobState::Rendering, JobState::Failed)
                | (JobState::Extracting, JobState::Failed)
                | (JobState::Planning, JobState::Failed)
        )
    }
}

/// One running or finished export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJob {
    pub id: JobId,
    pub output_path: std::path::PathBuf,
    pub state: JobState,
    pub progress_pct: f32,
    pub current_step: String,
}

impl ExportJob {
    pub fn new(output_path: std::path::PathBuf) -> Self {
        Self {
            id: JobId::new(),
            output_path,
            state: JobState::Planning,
            progress_pct: 0.0,
            current_step: "planning".to_string(),
        }
    }

    /// Attempt a state transition, returning `false` (and leaving the job unchanged) if illegal.
    pub fn advance(&mut self, next: JobState, step: impl Into<String>) -> bool {
        if !self.state.can_advance_to(next) {
            return false;
        }
        self.state = next;
        self.current_step = step.into();
        true
    }
}

/// One GPU-backed codec's measured capability (§4.5.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecCapability {
    pub codec_id: String,
    pub vendor_name: Option<String>,
    pub max_width: u32,
    pub max_height: u32,
}

/// Result of probing the local `ffmpeg` for hardware-accelerated encoders (§4.5.6). Cached for
/// the process lifetime once computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderCapability {
    pub ffmpeg_path: std::path::PathBuf,
    pub h264: Option<CodecCapability>,
    pub hevc: Option<CodecCapability>,
    pub gpu_name: Option<String>,
}

impl EncoderCapability {
    pub fn software_only(ffmpeg_path: std::path::PathBuf) -> Self {
        Self {
            ffmpeg_path,
            h264: None,
            hevc: None,
            gpu_name: None,
        }
    }

    pub fn has_hardware_encoder(&self) -> bool {
        self.h264.is_some() || self.hevc.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_reachable_from_any_nonterminal_state() {
        for state in [JobState::Planning, JobState::Extracting, JobState::Rendering] {
            assert!(state.can_advance_to(JobState::Cancelled));
        }
    }

    #[test]
    fn terminal_states_reject_further_transitions() {
        assert!(!JobState::Succeeded.can_advance_to(JobState::Rendering));
        assert!(!JobState::Cancelled.can_advance_to(JobState::Failed));
    }

    #[test]
    fn job_advance_rejects_illegal_transition() {
        let mut job = ExportJob::new("/tmp/out.mp4".into());
        assert!(!job.advance(JobState::Succeeded, "skip"));
        assert_eq!(job.state, JobState::Planning);
        assert!(job.advance(JobState::Extracting, "extracting"));
    }
}
