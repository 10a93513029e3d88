//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Balance records, keyed by `user_id`.
    pub const BALANCES: &str = "balances";

    /// Ledger entries, keyed by idempotency key.
    pub const LEDGER: &str = "ledger";

    /// Index: ledger entries by user, keyed by
    /// `len(user_id) || user_id || created_at || idempotency key`.
    /// Value is the idempotency key.
    pub const LEDGER_BY_USER: &str = "ledger_by_user";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::BALANCES, cf::LEDGER, cf::LEDGER_BY_USER]
}
