use std::time::Duration;

use thiserror::Error;

/// Failure of a single request to a single endpoint
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttemptError {
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("Server reported an error: {0}")]
    Remote(String),
}

impl AttemptError {
    /// Whether the same endpoint is worth another try
    pub fn is_retryable(&self) -> bool {
        match self {
            AttemptError::Timeout(_) | AttemptError::Transport(_) => true,
            AttemptError::Status(code) => *code == 429 || (500..600).contains(code),
            AttemptError::Parse(_) | AttemptError::Remote(_) => false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("No road data endpoints configured")]
    NoEndpoints,
    #[error("All endpoints failed after {attempts} attempts, last error: {last_error}")]
    Exhausted {
        attempts: usize,
        last_error: AttemptError,
    },
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(AttemptError::Status(503).is_retryable());
        assert!(AttemptError::Status(429).is_retryable());
        assert!(!AttemptError::Status(400).is_retryable());
        assert!(!AttemptError::Status(404).is_retryable());
        assert!(AttemptError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!AttemptError::Parse("eof".into()).is_retryable());
    }
}
