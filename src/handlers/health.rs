//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    ruleset_version: u32,
    policy: String,
}

pub async fn index() -> &'static str {
    "Spot The Fake backend is running..."
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        ruleset_version: state.detector.ruleset_version(),
        policy: state.detector.policy_id().to_string(),
    })
}
