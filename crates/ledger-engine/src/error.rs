//! Error types for the ledger engine.

use ledger_core::{AmountError, IdempotencyKey, StatusClass, UserId};

/// The balance read failed.
///
/// "No record" is not an error; see [`Balance::found`](crate::Balance::found).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// The store could not be read.
    #[error("failed to retrieve balance for {user_id}: {reason}")]
    ReadFailed {
        /// The user whose balance was requested.
        user_id: UserId,
        /// Store error, for logging only.
        reason: String,
    },
}

impl ReadError {
    /// Status classification of this error.
    #[must_use]
    pub const fn status_class(&self) -> StatusClass {
        StatusClass::ServerFault
    }
}

/// A commit that did not apply, or applied but could not report its balance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// The amount text is unusable; the store was not touched.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// A ledger entry with this key already exists.
    #[error("transaction {idempotent_key} is a duplicate")]
    DuplicateTransaction {
        /// The key that was already committed.
        idempotent_key: IdempotencyKey,
    },

    /// The debit exceeds the current balance, or the user has no balance.
    #[error("insufficient funds for this debit")]
    InsufficientFunds {
        /// The user that was debited.
        user_id: UserId,
    },

    /// The store rejected the write for another reason, or failed.
    #[error("transaction failed: {reason}")]
    TransactionFailed {
        /// Store detail, for logging only.
        reason: String,
    },

    /// The write applied but the new balance could not be read back.
    ///
    /// Resubmitting the same key reports `DuplicateTransaction`.
    #[error("transaction {idempotent_key} committed but the new balance is unavailable")]
    BalanceUnavailable {
        /// The key that was committed.
        idempotent_key: IdempotencyKey,
        /// The failed read.
        #[source]
        source: ReadError,
    },
}

impl CommitError {
    /// Status classification of this error.
    #[must_use]
    pub const fn status_class(&self) -> StatusClass {
        match self {
            Self::InvalidAmount(_) => StatusClass::BadInput,
            Self::DuplicateTransaction { .. } | Self::InsufficientFunds { .. } => {
                StatusClass::Conflict
            }
            Self::TransactionFailed { .. } | Self::BalanceUnavailable { .. } => {
                StatusClass::ServerFault
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn status_classes() {
        let user_id = UserId::new("u1").unwrap();
        let key = IdempotencyKey::new("a1").unwrap();

        assert_eq!(
            CommitError::InvalidAmount(AmountError::NotPositive(Decimal::ZERO)).status_class(),
            StatusClass::BadInput
        );
        assert_eq!(
            CommitError::DuplicateTransaction {
                idempotent_key: key.clone()
            }
            .status_class(),
            StatusClass::Conflict
        );
        assert_eq!(
            CommitError::InsufficientFunds {
                user_id: user_id.clone()
            }
            .status_class(),
            StatusClass::Conflict
        );
        assert_eq!(
            CommitError::TransactionFailed {
                reason: "boom".into()
            }
            .status_class(),
            StatusClass::ServerFault
        );

        let read = ReadError::ReadFailed {
            user_id,
            reason: "boom".into(),
        };
        assert_eq!(read.status_class(), StatusClass::ServerFault);
        assert_eq!(
            CommitError::BalanceUnavailable {
                idempotent_key: key,
                source: read,
            }
            .status_class(),
            StatusClass::ServerFault
        );
    }

    #[test]
    fn duplicate_message_names_the_key() {
        let err = CommitError::DuplicateTransaction {
            idempotent_key: IdempotencyKey::new("a1").unwrap(),
        };
        assert_eq!(err.to_string(), "transaction a1 is a duplicate");
    }
}
