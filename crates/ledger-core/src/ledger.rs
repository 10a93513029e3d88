//! Ledger entities.
//!
//! A [`BalanceRecord`] is the mutable running total for one user. A
//! [`LedgerEntry`] is the immutable record of one accepted transaction. Field
//! names are serialized in camelCase, which is the shape persisted by the
//! stores and returned by the HTTP API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Amount, IdempotencyKey, UserId};

/// The current balance of a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    /// The user this balance belongs to.
    pub user_id: UserId,

    /// Current balance. Never negative.
    ///
    /// A stored record without this field reads as zero.
    #[serde(default)]
    pub balance: Decimal,

    /// When the balance was last changed.
    pub updated_at: DateTime<Utc>,
}

impl BalanceRecord {
    /// Create a balance record.
    #[must_use]
    pub fn new(user_id: UserId, balance: Decimal, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            balance,
            updated_at,
        }
    }

    /// Check if the balance covers a debit of `amount`.
    #[must_use]
    pub fn covers(&self, amount: Amount) -> bool {
        self.balance >= amount.value()
    }
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Adds to the balance.
    Credit,

    /// Removes from the balance, only if the balance covers it.
    Debit,
}

impl TransactionType {
    /// Wire name of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// Apply the direction to a positive magnitude.
    #[must_use]
    pub fn signed(&self, amount: Amount) -> Decimal {
        match self {
            Self::Credit => amount.value(),
            Self::Debit => -amount.value(),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = TransactionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(TransactionTypeError(other.to_string())),
        }
    }
}

/// The text was neither `credit` nor `debit`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("type must be either 'credit' or 'debit', got '{0}'")]
pub struct TransactionTypeError(pub String);

/// Lifecycle status of a ledger entry.
///
/// Entries are only ever written once the paired balance change applies, so
/// the only status is `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    /// The transaction was applied.
    Completed,
}

/// The immutable record of one committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Caller-supplied key; at most one entry exists per key.
    pub idempotent_key: IdempotencyKey,

    /// The user whose balance was affected.
    pub user_id: UserId,

    /// Positive magnitude of the transaction.
    pub amount: Amount,

    /// Direction of the transaction.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Always `Completed`.
    pub status: EntryStatus,

    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create a completed entry.
    #[must_use]
    pub fn completed(
        idempotent_key: IdempotencyKey,
        user_id: UserId,
        amount: Amount,
        transaction_type: TransactionType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            idempotent_key,
            user_id,
            amount,
            transaction_type,
            status: EntryStatus::Completed,
            created_at,
        }
    }

    /// The amount with the sign implied by the direction.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.transaction_type.signed(self.amount)
    }
}
