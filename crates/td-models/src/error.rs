//! The cross-cutting error taxonomy surfaced at the progress-event boundary (§7).
//!
//! Every fallible operation across the workspace ultimately categorizes its failure into one of
//! these kinds before it reaches a caller; crate-local error types (see each crate's `error.rs`)
//! carry the full `thiserror` detail and map down to an `ErrorKind` at the boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Directory scanned successfully but contains no recognizable Tesla dashcam structure.
    NotATeslaClip,
    /// A clip group has no usable SEI telemetry on any camera.
    NoTelemetry,
    /// The SEI decoder returned a recoverable warning; extraction continued with partial data.
    DecoderWarning,
    /// No usable `ffmpeg` binary could be located.
    FfmpegMissing,
    /// Encoder capability probing found no encoder that can produce the requested canvas.
    NoUsableEncoder,
    /// The requested canvas resolution exceeds every available encoder's limit.
    CanvasExceedsEncoderLimit,
    /// The export request selects zero cameras, zero duration, or an empty collection.
    EmptySelection,
    /// `ffmpeg` exited non-zero or produced no output file.
    FfmpegRuntime,
    /// The job was cancelled by the caller before completion.
    Cancelled,
    /// Filesystem I/O failed (read, write, or permission error).
    IoError,
    /// A supplied blur zone is degenerate (fewer than 3 points or near-zero area).
    InvalidBlurZone,
}

impl ErrorKind {
    /// `true` for kinds that still leave a usable (if degraded) result — i.e. not fatal to the
    /// containing job.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorKind::NoTelemetry | ErrorKind::DecoderWarning)
    }
}
