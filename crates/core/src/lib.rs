//! Core types and pure logic for autoviz.
//!
//! This crate provides:
//! - The extracted product record and its validation gate
//! - Product-type classification over fixed keyword taxonomies
//! - Prompt synthesis for the image-generation service
//! - Unified error types
//! - Configuration structures

pub mod category;
pub mod config;
pub mod error;
pub mod product;
pub mod prompt;

pub use category::{ProductCategory, Taxonomy, classify};
pub use config::{AppConfig, ConfigError};
pub use error::{Error, UpstreamFailure};
pub use product::{DESCRIPTION_MAX_CHARS, MIN_NAME_CHARS, ProductRecord};
pub use prompt::{FALLBACK_VEHICLE, PromptInput, synthesize_prompt, vehicle_or_fallback};
