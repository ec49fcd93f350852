use thiserror::Error;

/// The two classes a rejected session transition falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed something that can never be valid.
    InvalidInput,
    /// The call is not allowed in the session's current state.
    InvalidState,
}

/// Errors returned by `QuizSession` transitions.
///
/// A transition that returns an error has not changed any session state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot start a quiz with no questions")]
    Empty,
    #[error("option {option} does not exist on question {index} ({options} options)")]
    OptionOutOfRange {
        index: usize,
        option: usize,
        options: usize,
    },
    #[error("no option selected for question {index}")]
    NothingSelected { index: usize },
    #[error("question {index} has already been checked")]
    Locked { index: usize },
    #[error("quiz session already completed")]
    Completed,
}

impl SessionError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Empty | SessionError::OptionOutOfRange { .. } => ErrorKind::InvalidInput,
            SessionError::NothingSelected { .. }
            | SessionError::Locked { .. }
            | SessionError::Completed => ErrorKind::InvalidState,
        }
    }
}
