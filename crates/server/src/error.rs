//! API error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid request body: {0}")]
    BadBody(String),

    #[error("Item not found")]
    ItemNotFound,

    #[error("Endpoint not found")]
    UnknownEndpoint,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
            ApiError::ItemNotFound | ApiError::UnknownEndpoint => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
