//! Product URL normalization.
//!
//! Storefront links pasted by users carry tracking noise (`utm_*`, `gclid`,
//! session tokens). Only the parameters that select a product variant survive.

/// Query parameters that change which product or variant a page shows.
pub const KEPT_QUERY_PARAMS: &[&str] = &["variant", "color", "colour", "size", "sku", "id", "item_id", "th", "psc"];

/// Error type for URL normalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("URL has no scheme; expected http:// or https://")]
    MissingScheme,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for autoviz_core::Error {
    fn from(err: UrlError) -> Self {
        autoviz_core::Error::InvalidUrl(err.to_string())
    }
}

/// Normalize a product URL.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an explicit http:// or https:// scheme
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep only allow-listed query parameters, in their original order
pub fn normalize_url(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    if !trimmed.contains("://") {
        return Err(UrlError::MissingScheme);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    let host = parsed.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    if host.is_empty() {
        return Err(UrlError::MissingHost);
    }
    parsed
        .set_host(Some(&host))
        .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    parsed.set_fragment(None);

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| KEPT_QUERY_PARAMS.contains(&k.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept);
    }

    Ok(parsed)
}

/// Normalize for display and logging, returning the input unchanged if it does not parse.
pub fn normalize_or_passthrough(input: &str) -> String {
    match normalize_url(input) {
        Ok(url) => url.to_string(),
        Err(_) => input.to_string(),
    }
}
