//! Unified error types for autoviz.
//!
//! Every failure of the extraction and visualization pipelines ends up as one of
//! these variants. Each variant has a stable machine code (the prefix of its
//! `Display` output) and a distinct user-facing message, since the caller has no
//! other way to tell a typo'd URL from a blocked storefront.

use std::fmt;

/// Category of a failed call to the image-generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// 401 or a missing API key.
    InvalidCredentials,
    /// 429.
    RateLimited,
    /// 400, typically a rejected image or prompt.
    BadRequest,
    /// 403.
    Forbidden,
    /// Anything else: 5xx, timeouts, malformed responses.
    Unknown,
}

impl UpstreamFailure {
    /// Categorize an HTTP status returned by the generation service.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => UpstreamFailure::InvalidCredentials,
            429 => UpstreamFailure::RateLimited,
            400 => UpstreamFailure::BadRequest,
            403 => UpstreamFailure::Forbidden,
            _ => UpstreamFailure::Unknown,
        }
    }
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpstreamFailure::InvalidCredentials => "invalid credentials",
            UpstreamFailure::RateLimited => "rate limited",
            UpstreamFailure::BadRequest => "bad request",
            UpstreamFailure::Forbidden => "forbidden",
            UpstreamFailure::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Unified error types for the autoviz pipelines.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid request input (e.g., missing product name, undecodable image).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The submitted URL could not be parsed.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// DNS resolution of the page host failed.
    #[error("HOST_NOT_FOUND: {0}")]
    HostNotFound(String),

    /// The host resolved to a private or reserved address.
    #[error("BLOCKED: {0}")]
    Blocked(String),

    /// The page did not answer within the configured bound.
    #[error("TIMEOUT: {0}")]
    Timeout(String),

    /// The page returned 404.
    #[error("HTTP_NOT_FOUND")]
    HttpNotFound,

    /// The page returned 403.
    #[error("HTTP_FORBIDDEN")]
    HttpForbidden,

    /// The page returned a 5xx status.
    #[error("HTTP_SERVER_ERROR: status {0}")]
    HttpServerError(u16),

    /// The response did not declare an HTML content type.
    #[error("NOT_HTML: {}", .0.as_deref().unwrap_or("no content type"))]
    NotHtmlContent(Option<String>),

    /// The response body exceeded the byte cap.
    #[error("TOO_LARGE: {0}")]
    TooLarge(String),

    /// Any other fetch failure.
    #[error("FETCH_FAILED: {0}")]
    UnknownFetch(String),

    /// The extracted record did not pass validation.
    #[error("EXTRACTION_FAILED: {0}")]
    ExtractionFailed(String),

    /// The image-generation service rejected or failed the request.
    #[error("UPSTREAM_FAILED: {kind}: {detail}")]
    UpstreamGenerationFailed { kind: UpstreamFailure, detail: String },
}

impl Error {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::HostNotFound(_) => "HOST_NOT_FOUND",
            Error::Blocked(_) => "BLOCKED",
            Error::Timeout(_) => "TIMEOUT",
            Error::HttpNotFound => "HTTP_NOT_FOUND",
            Error::HttpForbidden => "HTTP_FORBIDDEN",
            Error::HttpServerError(_) => "HTTP_SERVER_ERROR",
            Error::NotHtmlContent(_) => "NOT_HTML",
            Error::TooLarge(_) => "TOO_LARGE",
            Error::UnknownFetch(_) => "FETCH_FAILED",
            Error::ExtractionFailed(_) => "EXTRACTION_FAILED",
            Error::UpstreamGenerationFailed { .. } => "UPSTREAM_FAILED",
        }
    }

    /// Human-readable message shown to the end user.
    ///
    /// Internal details (status codes, resolver output) stay in the `Display`
    /// form for logs; this text is what leaves the process.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidInput(msg) => msg.clone(),
            Error::InvalidUrl(_) => "Invalid URL. Check the address and try again.".into(),
            Error::HostNotFound(_) => "Site not found. Check that the domain is spelled correctly.".into(),
            Error::Blocked(_) => "This address cannot be fetched.".into(),
            Error::Timeout(_) => "The site took too long to respond. Try again in a few minutes.".into(),
            Error::HttpNotFound => "Product page not found (404). Check that the link is still valid.".into(),
            Error::HttpForbidden => "The site blocked automated access (403). Try another product link.".into(),
            Error::HttpServerError(status) => {
                format!("The store's server returned an error ({status}). Try again in a few minutes.")
            }
            Error::NotHtmlContent(_) => "The URL does not point to a web page.".into(),
            Error::TooLarge(_) => "The page is too large to process.".into(),
            Error::UnknownFetch(_) => "Could not access the product page. Check the URL and try again.".into(),
            Error::ExtractionFailed(_) => {
                "Could not extract product data. Check that the URL points to a product page.".into()
            }
            Error::UpstreamGenerationFailed { kind, .. } => match kind {
                UpstreamFailure::InvalidCredentials => "Image service credentials are invalid or missing.".into(),
                UpstreamFailure::RateLimited => "Too many requests. Try again in a few minutes.".into(),
                UpstreamFailure::BadRequest => "The image service rejected the request. Try another photo.".into(),
                UpstreamFailure::Forbidden => "Access to the image service was denied.".into(),
                UpstreamFailure::Unknown => "The image service failed to process the request.".into(),
            },
        }
    }
}
