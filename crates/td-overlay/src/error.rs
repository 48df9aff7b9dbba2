use td_models::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("blur zone polygon is degenerate or has fewer than 3 points")]
    InvalidBlurZone,
    #[error("failed to encode overlay asset: {0}")]
    Encode(String),
}

pub type OverlayResult<T> = Result<T, OverlayError>;

impl OverlayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OverlayError::InvalidBlurZone => ErrorKind::InvalidBlurZone,
            OverlayError::Encode(_) => ErrorKind::IoError,
        }
    }
}
