use axum::{
    extract::{Query, State},
    Json,
};
use clarity_core::{AnalysisRequest, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub provider: String,
    pub provider_available: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let describer = state.processor().describer();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: clarity_core::VERSION.to_string(),
        provider: describer.provider_name().to_string(),
        provider_available: describer.provider_available().await,
    })
}

#[derive(Debug, Deserialize)]
pub struct DetectImageQuery {
    pub url: String,
}

/// Triage the image at `?url=`.
///
/// Pipeline failures are reported in the body with `"status": "error"`,
/// so the response is always 200 once the query parses.
pub async fn detect_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DetectImageQuery>,
) -> Json<AnalysisResult> {
    let request = AnalysisRequest::new(query.url);
    Json(state.processor().process(&request).await)
}
