//! Ledger engine: balance reads and transaction commits.
//!
//! - [`BalanceReader`] reads a user's balance; a missing record is a zero
//!   balance, not an error.
//! - [`TransactionCommitter`] validates an amount, submits the ledger insert
//!   and balance update as one conditional write, classifies rejections and
//!   reads the new balance back.
//!
//! Both components take the store as an `Arc<dyn Store>` and keep no state of
//! their own, so they can be cloned freely into concurrent request handlers.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use ledger_core::{IdempotencyKey, TransactionType, UserId};
//! use ledger_engine::{CommitError, TransactionCommitter};
//! use ledger_store::MemoryStore;
//!
//! let committer = TransactionCommitter::new(Arc::new(MemoryStore::new()));
//! let key = IdempotencyKey::new("a1").unwrap();
//! let user = UserId::new("u1").unwrap();
//!
//! let committed = committer
//!     .commit(&key, &user, "100.00", TransactionType::Credit)
//!     .unwrap();
//! assert_eq!(committed.new_balance.to_string(), "100.00");
//!
//! let replay = committer.commit(&key, &user, "100.00", TransactionType::Credit);
//! assert!(matches!(replay, Err(CommitError::DuplicateTransaction { .. })));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod committer;
pub mod error;
pub mod reader;

#[cfg(test)]
mod test_support;

pub use committer::{Committed, TransactionCommitter};
pub use error::{CommitError, ReadError};
pub use reader::{Balance, BalanceReader};
