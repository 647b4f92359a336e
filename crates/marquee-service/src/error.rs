//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden - valid credentials but wrong role.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input. Rejected before any ledger mutation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Payout amount under the configured floor.
    #[error("amount below minimum: minimum={minimum}, requested={requested}")]
    BelowMinimum {
        /// Configured floor in cents.
        minimum: i64,
        /// Requested amount in cents.
        requested: i64,
    },

    /// The account balance does not cover the requested amount.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance in cents.
        balance: i64,
        /// Required amount in cents.
        required: i64,
    },

    /// Internal server error. The failed transaction rolled back, so the
    /// caller may safely retry.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error (payment provider).
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::BelowMinimum { minimum, requested } => (
                StatusCode::BAD_REQUEST,
                "below_minimum",
                self.to_string(),
                Some(serde_json::json!({
                    "minimum_cents": minimum,
                    "requested_cents": requested
                })),
            ),
            Self::InsufficientFunds { balance, required } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_funds",
                self.to_string(),
                Some(serde_json::json!({
                    "balance_cents": balance,
                    "required_cents": required
                })),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_service_error",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<marquee_store::StoreError> for ApiError {
    fn from(err: marquee_store::StoreError) -> Self {
        match err {
            marquee_store::StoreError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} not found: {id}"))
            }
            // An already-resolved payout request is reported exactly like
            // a missing one: either way there is nothing left to process.
            marquee_store::StoreError::AlreadyResolved { id } => {
                tracing::warn!(request_id = %id, "attempt to re-process resolved payout request");
                Self::NotFound(format!("payout request not found or already processed: {id}"))
            }
            marquee_store::StoreError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds { balance, required }
            }
            marquee_store::StoreError::DuplicateReference { reference } => {
                Self::Conflict(format!("reference already recorded: {reference}"))
            }
            marquee_store::StoreError::InvalidAmount(amount) => {
                Self::BadRequest(format!("amount must be a positive number of cents, got {amount}"))
            }
            marquee_store::StoreError::Database(msg)
            | marquee_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}
