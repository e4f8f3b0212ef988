use crate::entities::cashout_requests::CashoutStatus;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Insufficient wallet balance")]
    InsufficientBalance,

    #[error("Cashout amount is below the minimum of {0}")]
    BelowMinimum(i64),

    #[error("A pending cashout request already exists for this user")]
    ConflictExistingPending,

    #[error("Invalid cashout state transition: {from} -> {to}")]
    InvalidStateTransition {
        from: CashoutStatus,
        to: CashoutStatus,
    },

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::InvalidAmount => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INVALID_AMOUNT",
                self.to_string(),
            ),
            AppError::InsufficientBalance => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INSUFFICIENT_BALANCE",
                self.to_string(),
            ),
            AppError::BelowMinimum(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "BELOW_MINIMUM",
                self.to_string(),
            ),
            AppError::ConflictExistingPending => (
                actix_web::http::StatusCode::CONFLICT,
                "PENDING_CASHOUT_EXISTS",
                self.to_string(),
            ),
            AppError::InvalidStateTransition { from, to } => {
                log::warn!("Invalid cashout state transition: {from} -> {to}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "INVALID_STATE_TRANSITION",
                    self.to_string(),
                )
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Forbidden".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
