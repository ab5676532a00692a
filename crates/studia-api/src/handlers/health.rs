//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Extraction strategies with a registered adapter.
    pub strategies: Vec<&'static str>,
}

/// Report process liveness. Does not call the gateway or the database.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut strategies: Vec<&'static str> = state
        .extraction
        .registry()
        .available_strategies()
        .iter()
        .map(|s| s.as_str())
        .collect();
    strategies.sort_unstable();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        strategies,
    })
}
