//! Semester API endpoints.

use axum::extract::{Path, State};
use serde_json::Value;

use super::{acknowledge, success, success_with_message, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::CreateSemesterRequest;
use crate::AppState;

/// GET /api/semester/:name - Get a single semester.
pub async fn get_semester(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Value> {
    let semester = state.store.semester(&name).await?;
    success(semester)
}

/// POST /api/semester - Create an empty semester.
pub async fn create_semester(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSemesterRequest>,
) -> ApiResult<Value> {
    let name = request.name().ok_or(AppError::MissingName)?;

    let semester = state.store.create_semester(&name).await?;
    success_with_message("Semester created", semester)
}

/// DELETE /api/semester/:name - Delete a semester.
pub async fn delete_semester(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<()> {
    state.store.delete_semester(&name).await?;
    acknowledge("Semester deleted")
}
