//! The opaque SEI decoder contract (§4.3).
//!
//! Byte-level MP4/H.264 SEI parsing is intentionally out of scope here; this crate only defines
//! the contract a decoder must satisfy and consumes it. A production embedding supplies a
//! [`SeiDecoder`] backed by an actual bitstream parser.

use thiserror::Error;

/// One frame's worth of telemetry, as yielded by a decoder over a single segment's bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedFrame {
    /// This frame's contribution to the segment-local clock.
    pub duration_ms: u32,
    pub sei: Option<RawSei>,
}

/// The telemetry fields as decoded straight off the bitstream, before the extractor stamps a
/// collection-relative `timestampMs` onto them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSei {
    pub speed_mps: f32,
    pub gear: td_models::Gear,
    pub autopilot: td_models::Autopilot,
    pub blinker_left: bool,
    pub blinker_right: bool,
    pub brake: bool,
    pub accelerator_pct: f32,
    pub steering_angle_deg: f32,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub heading_deg: Option<f64>,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("decoder failed on this segment: {0}")]
    Failed(String),
}

/// A pure function over segment bytes: `decodeFrames(bytes) -> sequence of { durationMs, sei? }`
/// (§4.3). Implementations must never perform I/O or block.
pub trait SeiDecoder: Send + Sync {
    fn decode_frames(&self, bytes: &[u8]) -> Result<Vec<DecodedFrame>, DecodeError>;
}
