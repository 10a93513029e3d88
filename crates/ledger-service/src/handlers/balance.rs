//! Balance handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ApiError;
use crate::handlers::parse_user_id;
use crate::state::AppState;

/// Balance response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// False when the user has no balance record yet.
    pub success: bool,
    /// Current balance; zero when there is no record.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// Explanation for a missing record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// HTTP status, echoed in the body.
    pub status_code: u16,
}

/// Get the current balance of a user.
///
/// A user without a record answers 404 with a zero balance; the read itself
/// succeeded.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<BalanceResponse>), ApiError> {
    let user_id = parse_user_id(user_id)?;
    let balance = state.reader.get_balance(&user_id)?;

    if !balance.found {
        tracing::debug!(user_id = %user_id, "No balance record found");
        return Ok((
            StatusCode::NOT_FOUND,
            Json(BalanceResponse {
                success: false,
                balance: Decimal::ZERO,
                message: Some(format!(
                    "No balance record found for userId {user_id}. Returning 0."
                )),
                status_code: StatusCode::NOT_FOUND.as_u16(),
            }),
        ));
    }

    Ok((
        StatusCode::OK,
        Json(BalanceResponse {
            success: true,
            balance: balance.balance,
            message: None,
            status_code: StatusCode::OK.as_u16(),
        }),
    ))
}
