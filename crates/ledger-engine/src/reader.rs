//! Balance reads.

use std::sync::Arc;

use rust_decimal::Decimal;

use ledger_core::UserId;
use ledger_store::Store;

use crate::error::ReadError;

/// Result of a balance read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    /// Whether the user has a balance record.
    pub found: bool,
    /// Current balance; zero when there is no record.
    pub balance: Decimal,
}

impl Balance {
    /// The balance of a user that has never been credited.
    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            found: false,
            balance: Decimal::ZERO,
        }
    }
}

/// Reads the current balance of a user straight from the store.
#[derive(Clone)]
pub struct BalanceReader {
    store: Arc<dyn Store>,
}

impl BalanceReader {
    /// Create a reader over a store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get the current balance for `user_id`.
    ///
    /// A user without a record has a zero balance and `found == false`; that
    /// is a successful read.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::ReadFailed` if the store fails. The read is not
    /// retried.
    pub fn get_balance(&self, user_id: &UserId) -> Result<Balance, ReadError> {
        let record = self.store.get_balance_record(user_id).map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to retrieve balance");
            ReadError::ReadFailed {
                user_id: user_id.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(record.map_or_else(Balance::not_found, |record| Balance {
            found: true,
            balance: record.balance,
        }))
    }
}
