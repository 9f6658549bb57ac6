//! Product field extraction from storefront HTML.
//!
//! ### Algorithm
//! - Detect the platform from the URL ([`PlatformKind::detect`]).
//! - For each field, walk the platform's [`SelectorRule`] table, then the shared
//!   metadata fallbacks, and keep the first non-empty value.
//! - Image values are resolved to absolute URLs against the page URL.
//!
//! ### Stable Abstraction
//! - Uses the `Extractor` trait so the pipeline does not depend on the rule engine.
//!
//! Unrecoverable fields stay empty. No placeholder text is ever substituted; the
//! validator decides whether the record is usable.

pub mod image;
pub mod platform;
pub mod rules;

pub use image::{first_srcset_candidate, resolve_image_url};
pub use platform::PlatformKind;
pub use rules::{Field, SelectorRule, meta_fallback, platform_rules};

use autoviz_core::ProductRecord;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Stable extractor trait for product extraction.
pub trait Extractor: Send + Sync {
    /// Extract a candidate product record from HTML. The result is not validated.
    ///
    /// `page_url` is used to resolve relative image paths and becomes the record's
    /// `source_url`.
    fn extract(&self, html: &str, platform: PlatformKind, page_url: &Url) -> ProductRecord;
}

/// Extractor driven by the static rule tables in [`rules`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleExtractor;

impl RuleExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for RuleExtractor {
    fn extract(&self, html: &str, platform: PlatformKind, page_url: &Url) -> ProductRecord {
        let document = Html::parse_document(html);

        let [name, description, image, price, vendor] =
            Field::ALL.map(|field| extract_field(&document, platform, field, page_url).unwrap_or_default());

        ProductRecord::new(&name, &description, &image, &price, &vendor, page_url.as_str())
    }
}

/// Extract a candidate record with the default rule extractor.
pub fn extract_product(html: &str, page_url: &Url) -> ProductRecord {
    let platform = PlatformKind::detect(page_url.as_str());
    RuleExtractor.extract(html, platform, page_url)
}

/// First non-empty value for `field`: platform rules, then metadata fallbacks.
pub fn extract_field(document: &Html, platform: PlatformKind, field: Field, page_url: &Url) -> Option<String> {
    let rules = platform_rules(platform, field)
        .iter()
        .chain(meta_fallback(field))
        .enumerate();

    for (index, rule) in rules {
        let Some(raw) = apply_rule(document, rule) else {
            continue;
        };

        let value = match field {
            Field::Image => {
                let candidate = match rule {
                    SelectorRule::Attr(_, attr) if attr.ends_with("srcset") => first_srcset_candidate(&raw),
                    _ => Some(raw.as_str()),
                };
                match candidate.and_then(|c| resolve_image_url(c, page_url)) {
                    Some(url) => url,
                    None => continue,
                }
            }
            _ => raw,
        };

        tracing::debug!(field = field.as_str(), %platform, rule = ?rule, index, "field matched");
        return Some(value);
    }

    tracing::debug!(field = field.as_str(), %platform, "no rule matched");
    None
}

/// Evaluate a single rule, returning its non-empty value.
pub fn apply_rule(document: &Html, rule: &SelectorRule) -> Option<String> {
    match rule {
        SelectorRule::Text(css) => {
            let selector = parse_selector(css)?;
            document.select(&selector).map(element_text).find(|t| !t.is_empty())
        }
        SelectorRule::Attr(css, attr) => {
            let selector = parse_selector(css)?;
            document
                .select(&selector)
                .filter_map(|el| el.value().attr(attr))
                .map(str::trim)
                .find(|v| !v.is_empty())
                .map(str::to_string)
        }
        SelectorRule::Meta(name) => {
            let selector = parse_selector(&format!("meta[property=\"{name}\"], meta[name=\"{name}\"]"))?;
            document
                .select(&selector)
                .filter_map(|el| el.value().attr("content"))
                .map(collapse_whitespace)
                .find(|v| !v.is_empty())
        }
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!(selector = css, error = %e, "skipping unparseable selector");
            None
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
