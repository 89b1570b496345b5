//! Health check endpoint.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::models::timestamp;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
}

/// GET /api/health - Liveness probe; does not touch the store.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running",
        timestamp: timestamp::format(&Utc::now()),
    })
}
