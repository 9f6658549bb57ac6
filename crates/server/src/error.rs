//! HTTP mapping of pipeline errors.
//!
//! Every failure leaves the server as `{ "success": false, "error": "..." }` with a
//! status code chosen by failure kind. The `error` text is the user-facing
//! message; internal detail only goes to the log.

use autoviz_core::{Error, UpstreamFailure};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Failure envelope returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// An error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

/// Status code for each failure kind.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidInput(_) | Error::InvalidUrl(_) | Error::Blocked(_) | Error::HostNotFound(_) => {
            StatusCode::BAD_REQUEST
        }
        Error::HttpNotFound => StatusCode::NOT_FOUND,
        Error::HttpForbidden => StatusCode::FORBIDDEN,
        Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::HttpServerError(_) | Error::UnknownFetch(_) => StatusCode::BAD_GATEWAY,
        Error::NotHtmlContent(_) | Error::ExtractionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        Error::UpstreamGenerationFailed { kind, .. } => match kind {
            UpstreamFailure::InvalidCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            UpstreamFailure::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            UpstreamFailure::BadRequest => StatusCode::BAD_REQUEST,
            UpstreamFailure::Forbidden => StatusCode::FORBIDDEN,
            UpstreamFailure::Unknown => StatusCode::BAD_GATEWAY,
        },
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!(code = err.code(), error = %err, "request failed");
        } else {
            tracing::info!(code = err.code(), error = %err, "request rejected");
        }
        Self::new(status, err.user_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        tracing::info!(status = %status, error = %rejection.body_text(), "malformed request body");
        Self::new(status, format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { success: false, error: self.message })).into_response()
    }
}
