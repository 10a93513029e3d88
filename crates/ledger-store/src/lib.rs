//! Transactional storage layer for the ledger.
//!
//! The [`Store`] trait is the boundary between the ledger engine and whatever
//! holds the data. A backend must provide:
//!
//! - point reads of balance records and ledger entries, and
//! - one all-or-nothing conditional write primitive, [`Store::submit`].
//!
//! Two backends are provided:
//!
//! - [`MemoryStore`]: process-local, used by tests and the `memory` backend.
//! - `RocksStore`: persistent, behind the `rocksdb-backend` feature, with the
//!   following column families:
//!   - `balances`: balance records, keyed by `user_id`
//!   - `ledger`: ledger entries, keyed by idempotency key
//!   - `ledger_by_user`: index for listing a user's entries by time
//!
//! # Example
//!
//! ```
//! use ledger_store::{MemoryStore, Store};
//! use ledger_core::UserId;
//!
//! let store = MemoryStore::new();
//! let user_id = UserId::new("u1").unwrap();
//! assert!(store.get_balance_record(&user_id).unwrap().is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod write;

#[cfg(feature = "rocksdb-backend")]
pub mod keys;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;
pub use write::{BalanceAdjustment, OperationStatus, WriteOp, WriteOutcome};

use ledger_core::{BalanceRecord, IdempotencyKey, LedgerEntry, UserId};

/// The storage trait defining all database operations.
///
/// Implementations are shared across concurrent requests, so every method
/// takes `&self`.
pub trait Store: Send + Sync {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Get the balance record for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_balance_record(&self, user_id: &UserId) -> Result<Option<BalanceRecord>>;

    /// Get a ledger entry by its idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_ledger_entry(&self, key: &IdempotencyKey) -> Result<Option<LedgerEntry>>;

    /// List ledger entries for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_entries_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>>;

    // =========================================================================
    // Conditional writes
    // =========================================================================

    /// Submit operations as one all-or-nothing conditional write.
    ///
    /// Preconditions are evaluated in submission order against the state
    /// before the write. A failed precondition is reported as
    /// `WriteOutcome::Rejected`, not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails; nothing is written in that case.
    fn submit(&self, ops: &[WriteOp]) -> Result<WriteOutcome>;
}
