use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to initialize recognition engine: {0}")]
    InitializationError(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Preprocessing failed: {0}")]
    PreprocessingError(String),

    #[error("Text recognition unavailable: {0}")]
    RecognitionUnavailable(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// Stable machine-readable code used in error responses
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::InitializationError(_) => "INIT_ERROR",
            ScanError::InvalidImage(_) => "INVALID_IMAGE",
            ScanError::PreprocessingError(_) => "PREPROCESSING_ERROR",
            ScanError::RecognitionUnavailable(_) => "RECOGNITION_UNAVAILABLE",
            ScanError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            ScanError::MissingFile => "MISSING_FILE",
            ScanError::InvalidRequest(_) => "INVALID_REQUEST",
            ScanError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ScanError::InitializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ScanError::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScanError::PreprocessingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ScanError::RecognitionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScanError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ScanError::MissingFile => StatusCode::BAD_REQUEST,
            ScanError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ScanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}
