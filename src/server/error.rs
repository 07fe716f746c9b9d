use crate::core::Error as CoreError;
use crate::server::types::ErrorResponse;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ApiError {
    /// The request carried no usable `image` field
    #[error("No image file provided")]
    MissingImage,

    /// The multipart body could not be parsed
    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error("Image exceeds the {limit} byte upload limit")]
    PayloadTooLarge { limit: usize },

    /// Decode, encode or storage failure
    #[error(transparent)]
    Processing(#[from] CoreError),
}

impl ApiError {
    pub fn from_multipart(err: MultipartError, limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge { limit }
        } else {
            ApiError::Multipart(err.body_text())
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Processing(_) => "Error compressing image".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Processing(_) => {
                tracing::error!("Compression failed: {:#}", self);
                ErrorResponse {
                    success: Some(false),
                    message: self.user_message(),
                }
            }
            _ => {
                tracing::debug!("Client error: {}", self);
                ErrorResponse {
                    success: None,
                    message: self.user_message(),
                }
            }
        };

        (self.status_code(), Json(body)).into_response()
    }
}
