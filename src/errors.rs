//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion into the `{data, error}` envelope.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::types::ApiResponse;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("User not found")]
    UserNotFound,

    #[error("Book not found")]
    BookNotFound,

    #[error("Cart not found")]
    CartNotFound,

    #[error("{0}")]
    FileNotFound(String),

    /// Authenticated caller does not own the resource
    #[error("{0}")]
    AccessDenied(String),

    /// Domain rule violated (duplicate purchase, cart state, ...)
    #[error("{0}")]
    Conflict(String),

    // Validation
    /// Field name -> message
    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("{0}")]
    InvalidArgument(String),

    // External service errors
    #[error("{0}")]
    FileStorage(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Get error key for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                "unauthorized"
            }
            AppError::Forbidden => "forbidden",
            AppError::UserNotFound | AppError::BookNotFound | AppError::CartNotFound => {
                "entity_not_found"
            }
            AppError::FileNotFound(_) => "file_not_found",
            AppError::AccessDenied(_) => "access_denied",
            AppError::Conflict(_) => "conflict",
            AppError::Validation(_) => "validation",
            AppError::InvalidArgument(_) => "invalid_argument",
            AppError::FileStorage(_) => "file_error",
            AppError::Database(_) | AppError::Internal(_) => "unknown",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::UserNotFound
            | AppError::BookNotFound
            | AppError::CartNotFound
            | AppError::FileNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::FileStorage(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Build the `error` map of the response envelope
    fn error_map(&self) -> BTreeMap<String, String> {
        match self {
            AppError::Validation(fields) => fields.clone(),
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                BTreeMap::from([(self.code().to_string(), "Invalid or expired token".to_string())])
            }
            AppError::Database(_) | AppError::Internal(_) | AppError::FileStorage(_) => {
                tracing::error!(error = %self, "Request failed");
                BTreeMap::from([(self.code().to_string(), self.to_string())])
            }
            _ => BTreeMap::from([(self.code().to_string(), self.to_string())]),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiResponse::failure(self.error_map());

        (status, body).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileStorage(err.to_string())
    }
}

/// Keeps the first message reported for each invalid field
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
            .collect();

        AppError::Validation(fields)
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_user_not_found(self) -> AppResult<T>;
    fn ok_or_book_not_found(self) -> AppResult<T>;
    fn ok_or_cart_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_user_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::UserNotFound)
    }

    fn ok_or_book_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::BookNotFound)
    }

    fn ok_or_cart_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::CartNotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    /// Single-field validation failure
    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        AppError::Validation(BTreeMap::from([(field.into(), msg.into())]))
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn access_denied(msg: impl Into<String>) -> Self {
        AppError::AccessDenied(msg.into())
    }

    pub fn file_not_found(msg: impl Into<String>) -> Self {
        AppError::FileNotFound(msg.into())
    }

    pub fn file_storage(msg: impl Into<String>) -> Self {
        AppError::FileStorage(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
