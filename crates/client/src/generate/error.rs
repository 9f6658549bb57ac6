//! Image-generation API client error types.

use std::sync::Arc;

use autoviz_core::{Error, UpstreamFailure};

/// Errors from the image-generation API client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// No API key configured.
    #[error("missing API key: AUTOVIZ_OPENAI_API_KEY not set")]
    MissingApiKey,

    /// The vehicle image could not be decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// The API rejected the request as malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The API refused access to the model or organization.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Any other HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error, or a response without any image.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { GenerationError::Timeout } else { GenerationError::Network(Arc::new(err)) }
    }
}

impl GenerationError {
    /// Build the error for a non-success status, keeping the API's own message.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => GenerationError::AuthError,
            429 => GenerationError::RateLimited,
            400 => GenerationError::BadRequest(message),
            403 => GenerationError::Forbidden(message),
            _ => GenerationError::HttpError { status },
        }
    }

    pub fn failure_kind(&self) -> UpstreamFailure {
        match self {
            GenerationError::MissingApiKey | GenerationError::AuthError => UpstreamFailure::InvalidCredentials,
            GenerationError::RateLimited => UpstreamFailure::RateLimited,
            GenerationError::BadRequest(_) => UpstreamFailure::BadRequest,
            GenerationError::Forbidden(_) => UpstreamFailure::Forbidden,
            GenerationError::HttpError { status } => UpstreamFailure::from_status(*status),
            GenerationError::InvalidImage(_)
            | GenerationError::Timeout
            | GenerationError::Network(_)
            | GenerationError::Parse(_) => UpstreamFailure::Unknown,
        }
    }
}

impl From<GenerationError> for Error {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InvalidImage(msg) => Error::InvalidInput(format!("invalid vehicle image: {msg}")),
            other => Error::UpstreamGenerationFailed { kind: other.failure_kind(), detail: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GenerationError::MissingApiKey;
        assert!(err.to_string().contains("API key"));

        let err = GenerationError::BadRequest("image too large".to_string());
        assert!(err.to_string().contains("image too large"));
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(GenerationError::from_status(401, String::new()), GenerationError::AuthError));
        assert!(matches!(GenerationError::from_status(429, String::new()), GenerationError::RateLimited));
        assert!(matches!(GenerationError::from_status(400, "x".into()), GenerationError::BadRequest(m) if m == "x"));
        assert!(matches!(GenerationError::from_status(403, String::new()), GenerationError::Forbidden(_)));
        assert!(matches!(GenerationError::from_status(503, String::new()), GenerationError::HttpError { status: 503 }));
    }

    #[test]
    fn test_into_core_error() {
        let err: Error = GenerationError::MissingApiKey.into();
        assert!(matches!(
            err,
            Error::UpstreamGenerationFailed { kind: UpstreamFailure::InvalidCredentials, .. }
        ));

        let err: Error = GenerationError::Timeout.into();
        assert!(matches!(err, Error::UpstreamGenerationFailed { kind: UpstreamFailure::Unknown, .. }));

        let err: Error = GenerationError::InvalidImage("empty".into()).into();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
