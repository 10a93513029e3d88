//! Core types for the ledger service.
//!
//! This crate provides the domain types shared by the store, the engine and the
//! HTTP service:
//!
//! - **Identifiers**: `UserId`, `IdempotencyKey`
//! - **Money**: `Amount`, parsed from the two-decimal wire format
//! - **Ledger**: `BalanceRecord`, `LedgerEntry`, `TransactionType`, `EntryStatus`
//! - **Outcomes**: `StatusClass`
//!
//! # Amounts
//!
//! Balances and amounts are held as `rust_decimal::Decimal` with two fractional
//! digits, so no floating point rounding ever touches a stored value.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod amount;
pub mod ids;
pub mod ledger;
pub mod status;

pub use amount::{Amount, AmountError, MAX_FRACTION_DIGITS};
pub use ids::{IdError, IdempotencyKey, UserId};
pub use ledger::{BalanceRecord, EntryStatus, LedgerEntry, TransactionType, TransactionTypeError};
pub use status::StatusClass;
