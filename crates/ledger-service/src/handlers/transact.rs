//! Transaction handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledger_core::{IdempotencyKey, TransactionType};

use crate::error::ApiError;
use crate::handlers::parse_user_id;
use crate::state::AppState;

/// Transaction request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactRequest {
    /// Caller-chosen key identifying this logical transaction.
    pub idempotent_key: String,
    /// User whose balance changes.
    pub user_id: String,
    /// Amount as a decimal string with at most two fractional digits.
    pub amount: String,
    /// `credit` or `debit`.
    #[serde(rename = "type")]
    pub transaction_type: String,
}

/// Transaction response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactResponse {
    /// Always true; failures are returned as `ApiError`.
    pub success: bool,
    /// Balance read back after the commit.
    #[serde(with = "rust_decimal::serde::float")]
    pub new_balance: Decimal,
    /// HTTP status, echoed in the body.
    pub status_code: u16,
}

/// Apply a credit or debit.
pub async fn transact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransactRequest>, JsonRejection>,
) -> Result<Json<TransactResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let idempotent_key =
        IdempotencyKey::new(body.idempotent_key).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let user_id = parse_user_id(body.user_id)?;
    let transaction_type: TransactionType = body
        .transaction_type
        .parse()
        .map_err(|_| ApiError::BadRequest("Type must be either 'credit' or 'debit'".into()))?;

    let committed =
        state
            .committer
            .commit(&idempotent_key, &user_id, &body.amount, transaction_type)?;

    Ok(Json(TransactResponse {
        success: true,
        new_balance: committed.new_balance,
        status_code: StatusCode::OK.as_u16(),
    }))
}
