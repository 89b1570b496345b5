//! Whole-document API endpoints.

use axum::extract::State;
use serde_json::Value;

use super::{acknowledge, success, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::{Document, ReplaceDocumentRequest};
use crate::AppState;

/// GET /api/data - Get the full document.
pub async fn get_data(State(state): State<AppState>) -> ApiResult<Document> {
    let document = state.store.load().await?;
    success(document)
}

/// POST /api/data - Replace the full document.
pub async fn save_data(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReplaceDocumentRequest>,
) -> ApiResult<()> {
    let document = match request.data {
        None | Some(Value::Null) => return Err(AppError::MissingPayload),
        Some(Value::Object(map)) => Document::from(map),
        Some(_) => {
            return Err(AppError::BadRequest(
                "Document must be a JSON object".to_string(),
            ))
        }
    };

    state.store.replace(document).await?;
    acknowledge("Data saved successfully")
}
