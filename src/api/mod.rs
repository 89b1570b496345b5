//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod data;
mod health;
mod semesters;

pub use data::*;
pub use health::*;
pub use semesters::*;

use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// JSON body extractor whose rejections use the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// `{success, data}`
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse {
        success: true,
        message: None,
        data: Some(data),
    })
}

/// `{success, message, data}`
pub fn success_with_message<T: Serialize>(message: &str, data: T) -> ApiResult<T> {
    Ok(ApiResponse {
        success: true,
        message: Some(message.to_string()),
        data: Some(data),
    })
}

/// `{success, message}`
pub fn acknowledge(message: &str) -> ApiResult<()> {
    Ok(ApiResponse {
        success: true,
        message: Some(message.to_string()),
        data: None,
    })
}
