//! Image URL fixing against the source page.

use url::Url;

/// Resolve an image reference found in a page to an absolute URL.
///
/// - `//cdn/x.jpg` gets an explicit `https:` scheme, whatever the page scheme
/// - `/img/x.jpg` and other relative paths resolve against the page URL
/// - absolute `http(s)` URLs pass through
///
/// Returns `None` for empty values, inline `data:` placeholders (lazy-load
/// spacers), and anything that does not resolve to an http(s) URL.
pub fn resolve_image_url(raw: &str, page_url: &Url) -> Option<String> {
    let raw = raw.trim();

    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }

    let resolved = if let Some(rest) = raw.strip_prefix("//") {
        Url::parse(&format!("https://{rest}")).ok()?
    } else {
        page_url.join(raw).ok()?
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// First URL of a `srcset` attribute value.
pub fn first_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next()
        .and_then(|candidate| candidate.split_whitespace().next())
        .filter(|s| !s.is_empty())
}
