//! Client code for autoviz.
//!
//! This crate provides the product-page fetch pipeline, rule-based field
//! extraction, and the image-generation API client used by the server.

pub mod extract;
pub mod fetch;
pub mod generate;
pub mod pipeline;

pub use extract::{Extractor, PlatformKind, RuleExtractor, extract_product};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, normalize_url};
pub use generate::{GenerationClient, GenerationConfig, GenerationError, ImageBackend, VehicleImage};
pub use pipeline::{ProductPipeline, Visualization, Visualizer};
