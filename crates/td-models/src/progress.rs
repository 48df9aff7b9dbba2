//! In-process progress events delivered from a running job to its subscribers (§6).

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::job::JobId;

/// Which phase of the pipeline a progress event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    Planning,
    Extracting,
    Rendering,
    DashboardCompile,
    MinimapCompile,
    Complete,
}

/// A human-facing message, either a literal or a translation key with parameters so the CLI /
/// embedding caller can localize it (§9 redesign: language is resolved at the edge, not baked
/// into the event stream).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Plain(String),
    Keyed {
        key: String,
        #[serde(default)]
        params: Vec<String>,
    },
}

impl Message {
    pub fn plain(text: impl Into<String>) -> Self {
        Message::Plain(text.into())
    }

    pub fn keyed(key: impl Into<String>, params: Vec<String>) -> Self {
        Message::Keyed {
            key: key.into(),
            params,
        }
    }
}

/// One update in a job's progress stream. Events for a job are delivered in non-decreasing
/// `seq` order; a `success` value other than `None` marks the final event for the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub job_id: JobId,
    pub seq: u64,
    pub kind: ProgressKind,
    /// `0.0..=100.0`, monotonic within a single `kind`.
    pub percent: f32,
    pub message: Message,
    pub success: Option<bool>,
    pub error: Option<ErrorKind>,
}

impl ProgressEvent {
    pub fn new(job_id: JobId, seq: u64, kind: ProgressKind, percent: f32, message: Message) -> Self {
        Self {
            job_id,
            seq,
            kind,
            percent,
            message,
            success: None,
            error: None,
        }
    }

    pub fn complete(job_id: JobId, seq: u64) -> Self {
        Self {
            job_id,
            seq,
            kind: ProgressKind::Complete,
            percent: 100.0,
            message: Message::plain("done"),
            success: Some(true),
            error: None,
        }
    }

    pub fn failed(job_id: JobId, seq: u64, error: ErrorKind, message: Message) -> Self {
        Self {
            job_id,
            seq,
            kind: ProgressKind::Complete,
            percent: 100.0,
            message,
            success: Some(false),
            error: Some(error),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.success.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_event_is_terminal_and_successful() {
        let event = ProgressEvent::complete(JobId::new(), 5);
        assert!(event.is_terminal());
        assert_eq!(event.success, Some(true));
    }

    #[test]
    fn failed_event_carries_error_kind() {
        let event = ProgressEvent::failed(
            JobId::new(),
            1,
            ErrorKind::FfmpegMissing,
            Message::plain("no ffmpeg"),
        );
        assert!(event.is_terminal());
        assert_eq!(event.error, Some(ErrorKind::FfmpegMissing));
    }
}
