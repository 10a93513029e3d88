//! Ledger history handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use ledger_core::LedgerEntry;

use crate::error::ApiError;
use crate::handlers::parse_user_id;
use crate::state::AppState;

/// Maximum page size for ledger listings.
const MAX_LIMIT: usize = 100;

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of entries to return (default: 50, max: 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// List transactions response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsResponse {
    /// Always true.
    pub success: bool,
    /// Ledger entries, newest first.
    pub transactions: Vec<LedgerEntry>,
    /// Whether there are more entries.
    pub has_more: bool,
}

/// List a user's ledger entries.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    let user_id = parse_user_id(user_id)?;

    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(MAX_LIMIT);
    let mut transactions = state
        .store
        .list_entries_by_user(&user_id, limit + 1, query.offset)?;

    let has_more = transactions.len() > limit;
    transactions.truncate(limit);

    Ok(Json(ListTransactionsResponse {
        success: true,
        transactions,
        has_more,
    }))
}
