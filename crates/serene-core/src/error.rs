//! Error types for Serene.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SereneError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("A message is already being sent")]
    SendInFlight,

    #[error("Chat view has been closed")]
    ViewClosed,

    #[error("Exercise sequence has no phases")]
    EmptySequence,

    #[error("Phase '{name}' has invalid duration {seconds}s (must be positive)")]
    InvalidPhaseDuration { name: String, seconds: i64 },

    #[error("{metric} must be between 1 and 10, got {value}")]
    MetricOutOfRange { metric: &'static str, value: i64 },

    #[error("Invalid mood score: {0}")]
    InvalidMoodScore(f64),

    #[error("Cannot move the week window by {weeks} weeks")]
    WindowOutOfRange { weeks: i64 },

    #[error("Not authenticated: please log in to continue")]
    Unauthorized,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of errors, used to pick a recovery path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; rejected with no state change
    Validation,
    /// Credentials missing, expired or rejected
    Auth,
    /// Network or server failure; recovered locally
    Transport,
}

impl SereneError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SereneError::EmptyMessage
            | SereneError::SendInFlight
            | SereneError::ViewClosed
            | SereneError::EmptySequence
            | SereneError::InvalidPhaseDuration { .. }
            | SereneError::MetricOutOfRange { .. }
            | SereneError::InvalidMoodScore(_)
            | SereneError::WindowOutOfRange { .. }
            | SereneError::Config(_) => ErrorKind::Validation,
            SereneError::Unauthorized => ErrorKind::Auth,
            SereneError::Transport(_)
            | SereneError::Server { .. }
            | SereneError::Decode(_)
            | SereneError::Json(_)
            | SereneError::Io(_) => ErrorKind::Transport,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}

impl From<reqwest::Error> for SereneError {
    fn from(e: reqwest::Error) -> Self {
        if e.status() == Some(reqwest::StatusCode::UNAUTHORIZED) {
            SereneError::Unauthorized
        } else if e.is_decode() {
            SereneError::Decode(e.to_string())
        } else {
            SereneError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(SereneError::EmptyMessage.kind(), ErrorKind::Validation);
        assert_eq!(SereneError::Unauthorized.kind(), ErrorKind::Auth);
        assert_eq!(
            SereneError::Server { status: 503, body: String::new() }.kind(),
            ErrorKind::Transport
        );
        assert_eq!(SereneError::WindowOutOfRange { weeks: 1 }.kind(), ErrorKind::Validation);
        assert!(SereneError::Unauthorized.is_auth());
    }
}
