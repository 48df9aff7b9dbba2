//! Error types for telemetry extraction.

use thiserror::Error;
use td_models::ErrorKind;

pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("IO error reading segment: {0}")]
    Io(#[from] std::io::Error),

    #[error("no telemetry available in the requested range")]
    NoTelemetry,
}

impl TelemetryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TelemetryError::Io(_) => ErrorKind::IoError,
            TelemetryError::NoTelemetry => ErrorKind::NoTelemetry,
        }
    }
}
