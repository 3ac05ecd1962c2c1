//! Detection error types.

use thiserror::Error;

pub type DetectResult<T> = Result<T, DetectError>;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Detector unavailable: {0}")]
    Unavailable(String),

    #[error("Detector returned {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid detector response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DetectError {
    /// Transient failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            DetectError::Unavailable(_) => true,
            DetectError::Network(e) => e.is_timeout() || e.is_connect(),
            DetectError::RequestFailed { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_retryable() {
        let err = DetectError::RequestFailed {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let err = DetectError::RequestFailed {
            status: 400,
            body: "bad image".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(!DetectError::InvalidResponse("truncated".to_string()).is_retryable());
    }
}
