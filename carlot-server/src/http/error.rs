//! API error types with IntoResponse
//!
//! Every failure renders the `{success: false, message}` envelope. Database
//! detail is logged here and never sent to the client.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::response::MessageResponse;
use crate::db::StoreError;

pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
pub const CAR_NOT_FOUND: &str = "Car not found";
pub const INSERT_FAILED: &str = "Failed to insert car";
pub const INVALID_BODY: &str = "Invalid request body";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Body is not valid JSON for the endpoint (400)
    InvalidBody,

    /// Update/delete matched no row, or the id cannot name one (404)
    NotFound,

    /// INSERT reported zero affected rows (500)
    InsertFailed,

    /// Checking out or configuring the request session failed (500, logged)
    Session {
        stage: &'static str,
        source: StoreError,
    },

    /// Query failed inside a handler (500, logged)
    Database(StoreError),

    /// Anything else (500)
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InsertFailed | Self::Session { .. } | Self::Database(_) | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidBody => INVALID_BODY,
            Self::NotFound => CAR_NOT_FOUND,
            Self::InsertFailed => INSERT_FAILED,
            Self::Session { .. } | Self::Database(_) | Self::Internal => INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Session { stage, source } => {
                tracing::error!(error = %source, "database session {} failed", stage);
            }
            Self::Database(e) => tracing::error!("Database error: {}", e),
            Self::InsertFailed => tracing::error!("insert reported zero affected rows"),
            _ => {}
        }

        (self.status(), Json(MessageResponse::failure(self.message()))).into_response()
    }
}

/// Response for a panicking handler, installed via `CatchPanicLayer::custom`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = detail, "handler panicked");

    ApiError::Internal.into_response()
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Database(e)
    }
}
