//! HTTP page fetcher for product pages.
//!
//! ### URL Normalization
//! - Trim whitespace, require an http(s) scheme
//! - Lowercase host, remove fragments
//! - Keep only variant-selecting query parameters
//!
//! ### Request
//! - Browser-like User-Agent, Accept and Accept-Language headers
//! - One deadline (default 20s) covering host resolution, connect, headers and body
//! - Max redirects: 5, each hop checked against the private-host gate
//! - Max body bytes: 5MB (configurable), enforced while streaming
//!
//! ### Failure taxonomy
//! Every failure is classified once, here, into a distinct [`Error`] variant:
//! DNS failure, timeout, 404, 403, 5xx, non-HTML content, or a catch-all.

pub mod ssrf;
pub mod url;

use std::error::Error as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use autoviz_core::{AppConfig, Error};
use bytes::{Bytes, BytesMut};
use reqwest::Url;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode, header};

pub use self::ssrf::{GatedResolver, SsrfError, blocked_literal, is_private_or_reserved, lookup_gated, resolve_public};
pub use self::url::{KEPT_QUERY_PARAMS, UrlError, normalize_or_passthrough, normalize_url};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: desktop Chrome)
    pub user_agent: String,

    /// Accept-Language header value
    pub accept_language: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Deadline for the whole fetch, resolution included (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Reject hosts resolving to private addresses (default: true)
    pub block_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl FetchConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            max_bytes: config.max_bytes,
            timeout: config.fetch_timeout(),
            max_redirects: config.max_redirects,
            block_private_hosts: config.block_private_hosts,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The normalized URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn html(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Whether a Content-Type header value declares an HTML document.
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// HTTP fetch client for product pages.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(redirect_policy(config.max_redirects, config.block_private_hosts))
            .dns_resolver(Arc::new(GatedResolver::new(config.block_private_hosts)))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::UnknownFetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Fetch a normalized product URL, returning raw bytes and metadata.
    ///
    /// Resolves the host first (see [`ssrf`]), then performs a single GET with
    /// whatever is left of the deadline. Nothing is retried.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let deadline = start + self.config.timeout;

        let resolved = tokio::time::timeout_at(deadline.into(), resolve_public(url, self.config.block_private_hosts))
            .await
            .map_err(|_| Error::Timeout(format!("resolving {} exceeded {:?}", url, self.config.timeout)))?
            .map_err(|e| match e {
                SsrfError::BlockedIp(_) => Error::Blocked(e.to_string()),
                SsrfError::DnsError { .. } | SsrfError::NoAddresses(_) => Error::HostNotFound(e.to_string()),
            })?;

        tracing::debug!(url = %url, addrs = ?resolved, "resolved product host");

        let mut response = self
            .http
            .get(url.as_str())
            .timeout(remaining_until(deadline, url)?)
            .header(header::ACCEPT, ACCEPT_HTML)
            .header(header::ACCEPT_LANGUAGE, &self.config.accept_language)
            .send()
            .await
            .map_err(|e| classify_send_error(&e))?;

        let status = response.status();
        check_status(status)?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if !content_type.as_deref().is_some_and(is_html_content_type) {
            return Err(Error::NotHtmlContent(content_type));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::TooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| classify_send_error(&e))? {
            append_capped(&mut body, &chunk, self.config.max_bytes)?;
        }
        let bytes = body.freeze();

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        Ok(FetchResponse { url: url.clone(), final_url, status, content_type, bytes, fetch_ms })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

/// Redirect policy: at most `max` hops, none of them to a private IP literal.
fn redirect_policy(max: usize, block_private: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max {
            attempt.error(format!("more than {max} redirects"))
        } else if block_private && let Some(ip) = blocked_literal(attempt.url()) {
            attempt.error(SsrfError::BlockedIp(ip))
        } else {
            attempt.follow()
        }
    })
}

/// Time left before `deadline`.
fn remaining_until(deadline: Instant, url: &Url) -> Result<Duration, Error> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        return Err(Error::Timeout(format!("{url}: deadline spent resolving the host")));
    }
    Ok(left)
}

fn append_capped(body: &mut BytesMut, chunk: &[u8], max_bytes: usize) -> Result<(), Error> {
    if body.len() + chunk.len() > max_bytes {
        return Err(Error::TooLarge(format!("body exceeds {max_bytes} bytes")));
    }
    body.extend_from_slice(chunk);
    Ok(())
}

/// Map a final response status onto the failure taxonomy. 2xx and 3xx pass.
fn check_status(status: StatusCode) -> Result<(), Error> {
    match status.as_u16() {
        200..=399 => Ok(()),
        404 => Err(Error::HttpNotFound),
        403 => Err(Error::HttpForbidden),
        code @ 500.. => Err(Error::HttpServerError(code)),
        code => Err(Error::UnknownFetch(format!("status {code}"))),
    }
}

fn classify_send_error(err: &reqwest::Error) -> Error {
    // gate refusals from a redirect hop or from the client's own resolver
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(gate) = inner.downcast_ref::<SsrfError>() {
            return match gate {
                SsrfError::BlockedIp(_) => Error::Blocked(gate.to_string()),
                SsrfError::DnsError { .. } | SsrfError::NoAddresses(_) => Error::HostNotFound(gate.to_string()),
            };
        }
        source = inner.source();
    }

    if err.is_timeout() {
        return Error::Timeout(err.to_string());
    }
    if err.is_redirect() {
        return Error::UnknownFetch(format!("redirect failed: {err}"));
    }

    let mut source = err.source();
    while let Some(inner) = source {
        if inner.to_string().contains("dns error") {
            return Error::HostNotFound(err.to_string());
        }
        source = inner.source();
    }

    Error::UnknownFetch(format!("network error: {err}"))
}
