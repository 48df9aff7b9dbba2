//! Error types for path parsing and indexing.

use thiserror::Error;
use td_models::ErrorKind;

pub type IndexerResult<T> = Result<T, IndexerError>;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("scanned root contains no recognizable Tesla dashcam structure")]
    NotATeslaClip,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexerError::NotATeslaClip => ErrorKind::NotATeslaClip,
            IndexerError::Io(_) => ErrorKind::IoError,
        }
    }
}

/// Why a path was rejected by the Path Parser (§4.1). Not an error — the Indexer treats every
/// variant as "silently skip this file."
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Filename doesn't match `^YYYY-MM-DD_HH-MM-SS-<camera>\.mp4$` and isn't a recognized
    /// event sidecar name.
    NotAClipFilename,
    /// Path has no filename component at all (a bare directory).
    NoFileName,
}
