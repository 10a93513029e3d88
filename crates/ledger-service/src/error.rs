//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use ledger_core::StatusClass;
use ledger_engine::{CommitError, ReadError};

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - the payload failed validation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A commit did not apply.
    #[error(transparent)]
    Commit(#[from] CommitError),

    /// A balance read failed.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    success: bool,
    code: &'static str,
    message: String,
    status_code: u16,
}

/// Map a protocol-neutral status class to an HTTP status.
#[must_use]
pub const fn http_status(class: StatusClass) -> StatusCode {
    match class {
        StatusClass::Success => StatusCode::OK,
        StatusClass::BadInput => StatusCode::BAD_REQUEST,
        StatusClass::Conflict => StatusCode::CONFLICT,
        StatusClass::ServerFault => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Self::Commit(err) => {
                let (code, message) = match err {
                    CommitError::InvalidAmount(_) => (
                        "invalid_amount",
                        "Invalid Amount value, Amount must be a positive number.".to_string(),
                    ),
                    CommitError::DuplicateTransaction { idempotent_key } => (
                        "duplicate_transaction",
                        format!("Transaction {idempotent_key} is a duplicate."),
                    ),
                    CommitError::InsufficientFunds { .. } => (
                        "insufficient_funds",
                        "Insufficient funds for this debit.".to_string(),
                    ),
                    CommitError::TransactionFailed { reason } => {
                        tracing::error!(error = %reason, "Transaction processing failed");
                        (
                            "transaction_failed",
                            "Transaction processing failed.".to_string(),
                        )
                    }
                    CommitError::BalanceUnavailable { source, .. } => {
                        tracing::error!(error = %source, "Committed balance unavailable");
                        (
                            "balance_unavailable",
                            "Transaction committed but the new balance could not be read."
                                .to_string(),
                        )
                    }
                };
                (http_status(err.status_class()), code, message)
            }
            Self::Read(err) => {
                tracing::error!(error = %err, "Balance read failed");
                (
                    http_status(err.status_class()),
                    "read_failed",
                    "Failed to retrieve balance.".to_string(),
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            code,
            message,
            status_code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ledger_store::StoreError> for ApiError {
    fn from(err: ledger_store::StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}
