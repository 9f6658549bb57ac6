//! Runtime settings for the server, fetcher and image client.
//!
//! Sources, highest precedence first: `AUTOVIZ_*` environment variables, the TOML
//! file named by `AUTOVIZ_CONFIG_FILE`, then built-in defaults.

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::category::Taxonomy;

mod validation;

pub use validation::ConfigError;

/// Desktop Chrome on Windows; several storefronts serve a bot wall to anything else.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                      (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Every tunable of the service. Components take the slice they need at
/// construction (`FetchConfig`, `GenerationConfig`) and never read the
/// environment themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the image-generation service.
    ///
    /// Set via AUTOVIZ_OPENAI_API_KEY environment variable.
    /// Required only when a visualization is requested.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Model used for image edits.
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Vision-capable model used to describe the vehicle photo.
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Output size requested from the image service.
    #[serde(default = "default_image_size")]
    pub image_size: String,

    /// Whether to ask the vision model for a vehicle description before generating.
    #[serde(default = "default_true")]
    pub describe_vehicle: bool,

    /// Keyword taxonomy used to classify products.
    #[serde(default)]
    pub taxonomy: Taxonomy,

    /// User-Agent string for page fetches.
    ///
    /// Set via AUTOVIZ_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header for page fetches.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Page fetch timeout in milliseconds.
    ///
    /// Set via AUTOVIZ_FETCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Maximum number of redirects to follow on page fetches.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Maximum bytes to read from a product page.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Reject product URLs whose host resolves to a private address.
    #[serde(default = "default_true")]
    pub block_private_hosts: bool,

    /// Image-generation timeout in milliseconds.
    #[serde(default = "default_generation_timeout_ms")]
    pub generation_timeout_ms: u64,

    /// Vision description timeout in milliseconds.
    #[serde(default = "default_vision_timeout_ms")]
    pub vision_timeout_ms: u64,

    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Maximum accepted request body, vehicle photo included.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Default tracing filter when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_image_model() -> String {
    "gpt-image-1".into()
}

fn default_vision_model() -> String {
    "gpt-4o-mini".into()
}

fn default_image_size() -> String {
    "1024x1024".into()
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}

fn default_accept_language() -> String {
    "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7".into()
}

fn default_fetch_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_generation_timeout_ms() -> u64 {
    120_000
}

fn default_vision_timeout_ms() -> u64 {
    20_000
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".into()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            image_model: default_image_model(),
            vision_model: default_vision_model(),
            image_size: default_image_size(),
            describe_vehicle: true,
            taxonomy: Taxonomy::default(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_redirects: default_max_redirects(),
            max_bytes: default_max_bytes(),
            block_private_hosts: true,
            generation_timeout_ms: default_generation_timeout_ms(),
            vision_timeout_ms: default_vision_timeout_ms(),
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
            cors_origins: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Page fetch timeout as Duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_millis(self.vision_timeout_ms)
    }

    /// Merge defaults, the optional TOML file and `AUTOVIZ_*` variables, then validate.
    ///
    /// Nested keys use a double underscore (`AUTOVIZ_A__B`).
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("AUTOVIZ_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("AUTOVIZ_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(&figment)
    }

    fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the image API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set or blank.
    pub fn require_openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "openai_api_key".into(),
                hint: "Set AUTOVIZ_OPENAI_API_KEY environment variable".into(),
            })
    }
}
