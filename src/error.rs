use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use factory_tint::{ParseColorError, TintError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Subject not found")]
    SubjectNotFound,

    #[error("Not found")]
    NotFound,

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Superseded by a newer request")]
    Superseded,

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ParseColorError> for ApiError {
    fn from(e: ParseColorError) -> Self {
        ApiError::InvalidColor(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Tint(#[from] TintError),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Render task failed: {0}")]
    Task(String),
}

impl RenderError {
    /// HTTP status for a failed render
    pub fn status(&self) -> StatusCode {
        match self {
            RenderError::Tint(TintError::Decode(_)) | RenderError::Tint(TintError::ParseColor(_)) => {
                StatusCode::BAD_REQUEST
            }
            RenderError::Tint(TintError::Allocation { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::SubjectNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::InvalidColor(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::InvalidImage(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Superseded => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Render(e) => (e.status(), e.to_string()),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        (status, body).into_response()
    }
}
