use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::constants::MSG_QUOTA_EXCEEDED;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Password hashing error")]
    PasswordHash,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Daily scan quota exceeded")]
    QuotaExceeded,

    #[error("No active subscription")]
    NotPro,

    #[error("Subscription already active")]
    AlreadyPro,
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // Quota rejections carry an extra flag so the extension can show
            // the upgrade prompt; everything else is a plain {message} body
            AppError::QuotaExceeded => {
                let body = Json(json!({
                    "message": MSG_QUOTA_EXCEEDED,
                    "upgradeRequired": true,
                }));
                return (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Transaction(ref e) => {
                tracing::error!("Transaction error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Table(ref e) => {
                tracing::error!("Table error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Commit(ref e) => {
                tracing::error!("Commit error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::TaskJoin(ref e) => {
                tracing::error!("Task join error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::PasswordHash => {
                tracing::error!("Password hashing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::EmailTaken => (StatusCode::BAD_REQUEST, "Email already exists"),
            AppError::InvalidCredentials => (StatusCode::BAD_REQUEST, "Invalid credentials"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AppError::InvalidInput(ref msg) => {
                tracing::debug!("Invalid input: {}", msg);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": msg })),
                )
                    .into_response();
            }
            AppError::MissingToken => (StatusCode::UNAUTHORIZED, "Access Denied: No Token Provided"),
            AppError::InvalidToken => (StatusCode::BAD_REQUEST, "Invalid Token"),
            AppError::InvalidSignature => (StatusCode::BAD_REQUEST, "Invalid signature sent!"),
            AppError::NotPro => (
                StatusCode::BAD_REQUEST,
                "You do not have an active subscription",
            ),
            AppError::AlreadyPro => (StatusCode::BAD_REQUEST, "You are already a Pro member!"),
        };

        let body = Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
