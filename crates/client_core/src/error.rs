use shared::error::{ErrorKind, SessionError};
use thiserror::Error;

pub const TRANSPORT_RETRY_MESSAGE: &str =
    "Could not reach the quiz service. Check your connection and try again.";

#[derive(Debug, Error)]
pub enum QuizApiError {
    /// The backend answered 2xx but reported a handled failure.
    #[error("quiz service reported an error: {0}")]
    Service(String),
    #[error("quiz service request failed: {0}")]
    Transport(String),
    #[error("quiz service returned an unusable response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for QuizApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::InvalidResponse(value.to_string())
        } else if let Some(status) = value.status() {
            Self::Transport(format!("HTTP {status}"))
        } else if value.is_timeout() {
            Self::Transport("request timed out".to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<QuizApiError> for SessionError {
    fn from(value: QuizApiError) -> Self {
        match value {
            QuizApiError::Service(message) => SessionError::new(ErrorKind::Service, message),
            QuizApiError::Transport(_) | QuizApiError::InvalidResponse(_) => {
                SessionError::new(ErrorKind::Transport, TRANSPORT_RETRY_MESSAGE)
            }
        }
    }
}
