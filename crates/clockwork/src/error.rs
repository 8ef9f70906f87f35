use thiserror::Error;

pub type Result<T, E = ClockError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ClockError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Timers incomplete: set a countdown for every dial (missing: {missing:?})")]
    IncompleteTimerConfiguration { missing: Vec<usize> },
    #[error("Malformed state: {0}")]
    MalformedState(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClockError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedState(msg.into())
    }

    /// Timer problems are the only errors a user can fix from the UI.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::IncompleteTimerConfiguration { .. })
    }
}

pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(ClockError::IndexOutOfRange { index, len })
    }
}
