//! `POST /generate-visualization`.
//!
//! Decodes the vehicle photo, then runs classify → describe → synthesize →
//! generate for the named product.

use autoviz_client::VehicleImage;
use autoviz_core::Error;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;

/// Request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVisualizationParams {
    /// Base64 image, bare or as a `data:image/...;base64,` URL.
    #[serde(default)]
    pub vehicle_image: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_description: Option<String>,
}

/// Success envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVisualizationResponse {
    pub success: bool,
    /// Hosted URL or inline data URL of the edited photo.
    pub result_image: String,
    pub product_name: String,
}

pub async fn generate_visualization(
    State(state): State<AppState>, body: Result<Json<GenerateVisualizationParams>, JsonRejection>,
) -> Result<Json<GenerateVisualizationResponse>, ApiError> {
    let Json(params) = body?;

    if params.vehicle_image.trim().is_empty() {
        return Err(Error::InvalidInput("vehicleImage is required".into()).into());
    }
    let image = VehicleImage::from_base64_payload(&params.vehicle_image).map_err(Error::from)?;

    let product_name = params.product_name.trim().to_string();
    let description = params.product_description.as_deref().unwrap_or_default();

    let visualization = state.visualizer.visualize(&image, &product_name, description).await?;
    tracing::info!(
        product = %product_name,
        category = %visualization.category,
        inline = visualization.result_image.starts_with("data:"),
        "visualization generated"
    );

    Ok(Json(GenerateVisualizationResponse { success: true, result_image: visualization.result_image, product_name }))
}
