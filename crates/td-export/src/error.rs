use td_models::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("no segments overlap the requested range for any selected camera")]
    EmptySelection,
    #[error(transparent)]
    Media(#[from] td_media::MediaError),
    #[error(transparent)]
    Overlay(#[from] td_overlay::OverlayError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PlannerResult<T> = Result<T, PlannerError>;

impl PlannerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlannerError::EmptySelection => ErrorKind::EmptySelection,
            PlannerError::Media(td_media::MediaError::FfmpegNotFound) => ErrorKind::FfmpegMissing,
            PlannerError::Media(_) => ErrorKind::FfmpegRuntime,
            PlannerError::Overlay(_) => ErrorKind::InvalidBlurZone,
            PlannerError::Io(_) => ErrorKind::IoError,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error(transparent)]
    Media(#[from] td_media::MediaError),
    #[error("export was cancelled")]
    Cancelled,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SupervisorResult<T> = Result<T, SupervisorError>;

impl SupervisorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SupervisorError::Planner(source) => source.kind(),
            SupervisorError::Media(td_media::MediaError::Cancelled) => ErrorKind::Cancelled,
            SupervisorError::Media(_) => ErrorKind::FfmpegRuntime,
            SupervisorError::Cancelled => ErrorKind::Cancelled,
            SupervisorError::Io(_) => ErrorKind::IoError,
        }
    }
}
