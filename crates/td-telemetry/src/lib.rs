//! Telemetry extraction from Tesla dashcam SEI metadata (§4.3).

pub mod decoder;
pub mod error;
pub mod extract;
pub mod nearest;

pub use decoder::{DecodeError, DecodedFrame, RawSei, SeiDecoder};
pub use error::{TelemetryError, TelemetryResult};
pub use extract::{extract_telemetry, ExtractionOutcome};
pub use nearest::nearest;
