//! The two end-to-end flows: product extraction and visualization.
//!
//! Each request runs normalize → fetch → extract → validate, or classify →
//! describe → synthesize → generate, strictly in sequence. Nothing is shared
//! between requests except the HTTP clients.

use std::sync::Arc;
use std::time::Instant;

use autoviz_core::{
    AppConfig, Error, FALLBACK_VEHICLE, ProductCategory, ProductRecord, PromptInput, Taxonomy, classify,
    synthesize_prompt, vehicle_or_fallback,
};

use crate::extract::{Extractor, PlatformKind, RuleExtractor};
use crate::fetch::{FetchClient, FetchConfig, normalize_or_passthrough, normalize_url};
use crate::generate::{ImageBackend, VehicleImage};

/// URL in, validated [`ProductRecord`] out.
pub struct ProductPipeline {
    fetch: FetchClient,
    extractor: Arc<dyn Extractor>,
}

impl ProductPipeline {
    pub fn new(fetch: FetchClient, extractor: Arc<dyn Extractor>) -> Self {
        Self { fetch, extractor }
    }

    /// Pipeline with the rule extractor and fetch settings from `config`.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let fetch = FetchClient::new(FetchConfig::from_app_config(config))?;
        Ok(Self::new(fetch, Arc::new(RuleExtractor::new())))
    }

    /// Run the full extraction for a user-submitted URL.
    ///
    /// Image paths resolve against the post-redirect URL; `source_url` is the
    /// normalized submission.
    pub async fn extract(&self, raw_url: &str) -> Result<ProductRecord, Error> {
        let start = Instant::now();
        let url = normalize_url(raw_url).inspect_err(|e| {
            tracing::info!(url = %normalize_or_passthrough(raw_url), error = %e, "rejected product URL");
        })?;

        let platform = PlatformKind::detect(url.as_str());
        tracing::info!(url = %url, platform = %platform, "extracting product");

        let response = self.fetch.fetch(&url).await?;
        let html = response.html();

        let mut record = self.extractor.extract(&html, platform, &response.final_url);
        record.source_url = url.to_string();

        let record = record.validated()?;
        tracing::info!(
            url = %url,
            name = %record.name,
            has_image = !record.image.is_empty(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "product extracted"
        );
        Ok(record)
    }
}

/// The outcome of a visualization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visualization {
    /// Hosted URL or inline `data:` URL of the edited photo.
    pub result_image: String,
    pub category: ProductCategory,
    pub prompt: String,
}

/// Vehicle photo plus product text in, edited photo out.
pub struct Visualizer {
    backend: Arc<dyn ImageBackend>,
    taxonomy: Taxonomy,
    describe_vehicle: bool,
}

impl Visualizer {
    pub fn new(backend: Arc<dyn ImageBackend>, taxonomy: Taxonomy, describe_vehicle: bool) -> Self {
        Self { backend, taxonomy, describe_vehicle }
    }

    pub fn from_app_config(backend: Arc<dyn ImageBackend>, config: &AppConfig) -> Self {
        Self::new(backend, config.taxonomy, config.describe_vehicle)
    }

    pub async fn visualize(
        &self, image: &VehicleImage, product_name: &str, product_description: &str,
    ) -> Result<Visualization, Error> {
        let name = product_name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("productName is required".into()));
        }

        let category = classify(self.taxonomy, name, product_description);
        tracing::info!(product = %name, category = %category, "visualizing product");

        let vehicle = if self.describe_vehicle {
            vehicle_or_fallback(self.backend.describe_vehicle(image).await)
        } else {
            FALLBACK_VEHICLE.to_string()
        };

        let prompt = synthesize_prompt(&PromptInput {
            category,
            name,
            description: product_description.trim(),
            vehicle: &vehicle,
        });
        tracing::debug!(prompt = %prompt, "synthesized prompt");

        let result_image = self.backend.generate(image, &prompt).await.map_err(|e| {
            tracing::warn!(error = %e, "image generation failed");
            Error::from(e)
        })?;

        Ok(Visualization { result_image, category, prompt })
    }
}
