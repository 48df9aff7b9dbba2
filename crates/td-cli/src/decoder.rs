//! Default [`SeiDecoder`] wired into the CLI.
//!
//! Byte-level SEI parsing is out of scope for this engine (§4.3): the contract is deliberately
//! opaque so embeddings can plug in whatever bitstream parser matches their firmware version.
//! This binary has no such parser, so it reports zero frames for every segment rather than
//! guessing at a format. A real deployment links a decoder backed by an actual H.264 SEI reader.

use td_telemetry::{DecodeError, DecodedFrame, SeiDecoder};

pub struct NullSeiDecoder;

impl SeiDecoder for NullSeiDecoder {
    fn decode_frames(&self, _bytes: &[u8]) -> Result<Vec<DecodedFrame>, DecodeError> {
        Ok(Vec::new())
    }
}
