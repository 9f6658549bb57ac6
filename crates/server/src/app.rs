//! Router assembly and shared state.

use std::sync::Arc;

use autoviz_client::{ProductPipeline, Visualizer};
use autoviz_core::AppConfig;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::extract_product::extract_product;
use crate::routes::generate_visualization::generate_visualization;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ProductPipeline>,
    pub visualizer: Arc<Visualizer>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    version: &'static str,
}

pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract-product", post(extract_product))
        .route("/generate-visualization", post(generate_visualization))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors(&config.cors_origins))
                .layer(DefaultBodyLimit::max(config.max_body_bytes)),
        )
        .with_state(state)
}

/// CORS for the browser front end. No configured origins means any origin.
fn build_cors(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn health() -> Json<HealthData> {
    Json(HealthData { status: "ok", version: env!("CARGO_PKG_VERSION") })
}
