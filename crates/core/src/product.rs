//! The structured product record recovered from a product page.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Minimum length, in characters, of a trimmed product name.
pub const MIN_NAME_CHARS: usize = 3;

/// Descriptions are cut to this many characters.
pub const DESCRIPTION_MAX_CHARS: usize = 300;

/// A product extracted from a storefront page.
///
/// Built fresh per request and never persisted. Use [`ProductRecord::new`] so the
/// field invariants (trimmed text, capped description) hold, then
/// [`ProductRecord::validate`] before handing it to anything downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub description: String,
    /// Absolute image URL, or empty.
    pub image: String,
    /// Raw price text as shown on the page.
    pub price: String,
    pub vendor: String,
    pub source_url: String,
}

impl ProductRecord {
    pub fn new(
        name: &str, description: &str, image: &str, price: &str, vendor: &str, source_url: &str,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            description: truncate_chars(description.trim(), DESCRIPTION_MAX_CHARS),
            image: image.trim().to_string(),
            price: price.trim().to_string(),
            vendor: vendor.trim().to_string(),
            source_url: source_url.to_string(),
        }
    }

    /// The single quality gate of the extraction pipeline.
    ///
    /// Only the name is checked: it is the one field prompt synthesis cannot do
    /// without.
    pub fn validate(&self) -> Result<(), Error> {
        let len = self.name.trim().chars().count();
        if len < MIN_NAME_CHARS {
            return Err(Error::ExtractionFailed(format!(
                "product name has {len} characters (minimum {MIN_NAME_CHARS}) for {}",
                self.source_url
            )));
        }
        Ok(())
    }

    /// Consume the candidate, returning it only if it passes [`validate`](Self::validate).
    pub fn validated(self) -> Result<Self, Error> {
        self.validate()?;
        Ok(self)
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
