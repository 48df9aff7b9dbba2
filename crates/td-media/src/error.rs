//! Error types for FFmpeg/FFprobe process wrapping.

use thiserror::Error;
use td_models::ErrorKind;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("no usable ffmpeg binary could be located")]
    FfmpegNotFound,

    #[error("no usable ffprobe binary could be located")]
    FfprobeNotFound,

    #[error("ffmpeg exited with non-zero status{}", .exit_code.map(|c| format!(" ({c})")).unwrap_or_default())]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("ffprobe failed: {message}")]
    FfprobeFailed { message: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaError::FfmpegNotFound => ErrorKind::FfmpegMissing,
            MediaError::Cancelled => ErrorKind::Cancelled,
            MediaError::Io(_) => ErrorKind::IoError,
            MediaError::FfmpegFailed { .. } | MediaError::FfprobeFailed { .. } => {
                ErrorKind::FfmpegRuntime
            }
            MediaError::JsonParse(_) => ErrorKind::FfmpegRuntime,
        }
    }
}
