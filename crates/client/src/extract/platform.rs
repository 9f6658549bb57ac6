//! Storefront platform detection from the URL alone.

use std::fmt;

use serde::Serialize;

/// Storefront software family whose markup conventions are known in advance.
///
/// Determined once per extraction and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Shopify,
    MercadoLivre,
    Amazon,
    Generic,
}

/// URL fragments per platform, checked in this order.
const MARKERS: &[(PlatformKind, &[&str])] = &[
    (PlatformKind::Shopify, &["myshopify.com", "shopify"]),
    (PlatformKind::MercadoLivre, &["mercadolivre", "mercadolibre"]),
    (PlatformKind::Amazon, &["amazon.", "amzn."]),
];

impl PlatformKind {
    /// Classify a normalized URL. Case-insensitive, no network, always returns a value.
    pub fn detect(url: &str) -> Self {
        let url = url.to_lowercase();
        MARKERS
            .iter()
            .find(|(_, markers)| markers.iter().any(|m| url.contains(m)))
            .map(|(kind, _)| *kind)
            .unwrap_or(PlatformKind::Generic)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlatformKind::Shopify => "shopify",
            PlatformKind::MercadoLivre => "mercadolivre",
            PlatformKind::Amazon => "amazon",
            PlatformKind::Generic => "generic",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
