//! API handlers.

pub mod balance;
pub mod health;
pub mod transact;
pub mod transactions;

use ledger_core::UserId;

use crate::error::ApiError;

/// Validate a user ID taken from a path or body.
fn parse_user_id(raw: String) -> Result<UserId, ApiError> {
    UserId::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}
