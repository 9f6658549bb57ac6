//! Image-generation API client.
//!
//! Talks to an OpenAI-compatible API for the two outbound calls of a
//! visualization:
//!
//! - **Vehicle description**: `POST {base}/chat/completions` with the photo as a
//!   data URL, asking a vision model for a one-phrase description.
//! - **Image edit**: `POST {base}/images/edits` (multipart) with the photo, scaled
//!   to fit 1024x1024 and re-encoded as JPEG, and the synthesized prompt. The
//!   result is a hosted URL or an inline data URL.
//!
//! ### Behavior
//!
//! - **Authentication**: `Authorization: Bearer <key>`. A missing key fails before
//!   any network traffic.
//! - **Timeouts**: each call has its own bound; nothing is retried.
//! - **Errors**: status codes are categorised once into [`GenerationError`].

pub mod error;
pub mod request;
pub mod response;

pub use error::GenerationError;
pub use request::{ChatRequest, DESCRIBE_VEHICLE_PROMPT, MAX_UPLOAD_SIDE, VehicleImage};
pub use response::{ChatResponse, ImagesResponse};

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use autoviz_core::AppConfig;
use reqwest::{header, multipart};

/// Default user agent for API calls.
const DEFAULT_USER_AGENT: &str = concat!("autoviz/", env!("CARGO_PKG_VERSION"));

/// Image-generation client configuration.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// API key; `None` makes every call fail with `MissingApiKey`.
    pub api_key: Option<String>,
    /// Base URL (default: https://api.openai.com/v1).
    pub base_url: String,
    pub image_model: String,
    pub vision_model: String,
    /// Output size, e.g. "1024x1024".
    pub image_size: String,
    /// Timeout for the image edit call.
    pub timeout: Duration,
    /// Timeout for the vision description call.
    pub vision_timeout: Duration,
    pub user_agent: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl GenerationConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.require_openai_api_key().ok().map(str::to_string),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            image_model: config.image_model.clone(),
            vision_model: config.vision_model.clone(),
            image_size: config.image_size.clone(),
            timeout: config.generation_timeout(),
            vision_timeout: config.vision_timeout(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// The external services a visualization depends on.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Short free-text description of the vehicle in the photo.
    async fn describe_vehicle(&self, image: &VehicleImage) -> Result<String, GenerationError>;

    /// Edit the photo according to `prompt`, returning the result image URL.
    async fn generate(&self, image: &VehicleImage, prompt: &str) -> Result<String, GenerationError>;
}

/// OpenAI-compatible image-generation client.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    config: Arc<GenerationConfig>,
}

impl GenerationClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .build()
            .map_err(|e| GenerationError::Network(Arc::new(e)))?;

        Ok(Self { http, config: Arc::new(config) })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingApiKey)
    }

    /// Turn a response into its body bytes, classifying non-success statuses.
    async fn read_success(http_response: reqwest::Response) -> Result<bytes::Bytes, GenerationError> {
        let status = http_response.status();
        tracing::debug!("image API response status: {}", status);

        let body = http_response.bytes().await?;

        if !status.is_success() {
            return Err(GenerationError::from_status(status.as_u16(), response::error_message(&body)));
        }

        Ok(body)
    }
}

#[async_trait]
impl ImageBackend for GenerationClient {
    async fn describe_vehicle(&self, image: &VehicleImage) -> Result<String, GenerationError> {
        let api_key = self.api_key()?;
        let start = Instant::now();
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = ChatRequest::describe_vehicle(&self.config.vision_model, image);

        let http_response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .header(header::ACCEPT, "application/json")
            .timeout(self.config.vision_timeout)
            .json(&body)
            .send()
            .await?;

        let bytes = Self::read_success(http_response).await?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes).map_err(|e| GenerationError::Parse(e.to_string()))?;
        let text = parsed
            .first_text()
            .ok_or_else(|| GenerationError::Parse("vision response had no choices".into()))?;

        tracing::debug!(elapsed = ?start.elapsed(), description = %text, "vehicle described");
        Ok(text)
    }

    async fn generate(&self, image: &VehicleImage, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key()?;
        let start = Instant::now();
        let url = format!("{}/images/edits", self.config.base_url);

        let upload = image.prepared_for_upload(MAX_UPLOAD_SIDE)?;
        let image_part = multipart::Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name())
            .mime_str(&upload.mime)
            .map_err(|e| GenerationError::InvalidImage(e.to_string()))?;

        let form = multipart::Form::new()
            .part("image", image_part)
            .text("prompt", prompt.to_string())
            .text("model", self.config.image_model.clone())
            .text("size", self.config.image_size.clone())
            .text("n", "1");

        tracing::debug!(model = %self.config.image_model, prompt_chars = prompt.len(), "requesting image edit");

        let http_response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .header(header::ACCEPT, "application/json")
            .timeout(self.config.timeout)
            .multipart(form)
            .send()
            .await?;

        let bytes = Self::read_success(http_response).await?;
        let parsed: ImagesResponse =
            serde_json::from_slice(&bytes).map_err(|e| GenerationError::Parse(e.to_string()))?;

        let result = parsed.into_result_image()?;
        tracing::debug!("image edit completed in {:?}", start.elapsed());
        Ok(result)
    }
}
