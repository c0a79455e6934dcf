use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::db::StoreError;
use crate::hal::Hal;
use crate::types::{ApiErrorCode, ApiErrorResponse, ValidationErrors};

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationErrors),
    Conflict(String),
    NotFound(String),
    Db(sqlx::Error),
    Internal(String),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(errors) => ApiError::Validation(errors),
            StoreError::Conflict(message) => ApiError::Conflict(message),
            StoreError::Db(db) => ApiError::Db(db),
            StoreError::NotFound(message) => ApiError::NotFound(message),
            StoreError::Parse(message) => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Validation(errors) => {
                tracing::debug!(%errors, "request rejected");
                return (StatusCode::BAD_REQUEST, Hal(errors)).into_response();
            }
            ApiError::Conflict(message) => (StatusCode::CONFLICT, ApiErrorCode::Conflict, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, ApiErrorCode::NotFound, message),
            ApiError::Db(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::Database,
                    "database error".to_string(),
                )
            }
            ApiError::Internal(message) => {
                tracing::error!(%message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::Internal,
                    "internal error".to_string(),
                )
            }
        };

        (status, Hal(ApiErrorResponse { code, message })).into_response()
    }
}
