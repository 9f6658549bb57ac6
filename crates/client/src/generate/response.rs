//! Response types for the image-generation API.

use serde::Deserialize;

use crate::generate::GenerationError;

/// Raw chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn first_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}

/// Raw images response.
#[derive(Debug, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
pub struct ImageDatum {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
}

impl ImagesResponse {
    /// The generated image as a URL: the hosted URL if present, else an inline data URL.
    pub fn into_result_image(self) -> Result<String, GenerationError> {
        let datum = self
            .data
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::Parse("response contained no images".into()))?;

        match (datum.url, datum.b64_json) {
            (Some(url), _) if !url.is_empty() => Ok(url),
            (_, Some(b64)) if !b64.is_empty() => Ok(format!("data:image/png;base64,{b64}")),
            _ => Err(GenerationError::Parse("image entry has neither url nor b64_json".into())),
        }
    }
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
}

/// Best-effort extraction of the API's error message from a response body.
pub fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).chars().take(200).collect())
}
