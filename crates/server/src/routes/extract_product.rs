//! `POST /extract-product`.
//!
//! Turns a storefront URL into a validated product record.

use autoviz_core::ProductRecord;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;

/// Request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractProductParams {
    /// Product page URL as typed by the user, including its http(s) scheme.
    #[serde(default)]
    pub url: String,
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ExtractProductResponse {
    pub success: bool,
    pub product: ProductRecord,
}

pub async fn extract_product(
    State(state): State<AppState>, body: Result<Json<ExtractProductParams>, JsonRejection>,
) -> Result<Json<ExtractProductResponse>, ApiError> {
    let Json(params) = body?;
    let product = state.pipeline.extract(&params.url).await?;
    Ok(Json(ExtractProductResponse { success: true, product }))
}
