use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::errors::PhishError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    BadGateway(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, msg) = match &self {
            AppError::BadRequest(s) => (StatusCode::BAD_REQUEST, s),
            AppError::BadGateway(s) => (StatusCode::BAD_GATEWAY, s),
            AppError::NotFound(s) => (StatusCode::NOT_FOUND, s),
            AppError::Internal(s) => {
                tracing::error!(error = %s, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, s)
            }
        };
        (code, Json(ErrBody { error: msg.clone() })).into_response()
    }
}

impl From<PhishError> for AppError {
    fn from(err: PhishError) -> Self {
        match err {
            PhishError::Validation { message, .. } => AppError::BadRequest(message),
            PhishError::Classifier { message } => AppError::BadGateway(message),
            PhishError::Network { operation, source } => {
                AppError::BadGateway(format!("Network {operation} failed: {source}"))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}
