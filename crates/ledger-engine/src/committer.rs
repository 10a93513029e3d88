//! Idempotent, atomic ledger commits.
//!
//! A commit is one conditional write of two operations, always in this order:
//!
//! 1. insert the ledger entry, if its idempotency key is new;
//! 2. credit or debit the balance, a debit only if the balance covers it.
//!
//! The store applies both or neither. A rejection is classified by walking the
//! per-operation statuses in the same order, so a replayed key is reported as a
//! duplicate even when the debit would also have been short.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use ledger_core::{Amount, IdempotencyKey, LedgerEntry, TransactionType, UserId};
use ledger_store::{BalanceAdjustment, OperationStatus, Store, WriteOp, WriteOutcome};

use crate::error::CommitError;
use crate::reader::BalanceReader;

const LEDGER_INSERT: usize = 0;
const BALANCE_UPDATE: usize = 1;

/// A transaction that applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    /// The ledger entry that was written.
    pub entry: LedgerEntry,
    /// Balance read back after the write.
    ///
    /// The read is not part of the write, so under concurrent load it may
    /// already include later transactions for the same user.
    pub new_balance: Decimal,
}

/// Applies credits and debits to user balances.
#[derive(Clone)]
pub struct TransactionCommitter {
    store: Arc<dyn Store>,
    reader: BalanceReader,
}

impl TransactionCommitter {
    /// Create a committer over a store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        let reader = BalanceReader::new(Arc::clone(&store));
        Self { store, reader }
    }

    /// Commit one transaction.
    ///
    /// `amount_text` is the wire form of the amount and is validated before
    /// the store is touched. Nothing is retried; resubmitting the same
    /// `idempotent_key` is safe and reports `DuplicateTransaction`.
    ///
    /// # Errors
    ///
    /// - `CommitError::InvalidAmount` if the amount is malformed or not positive.
    /// - `CommitError::DuplicateTransaction` if the key was already committed.
    /// - `CommitError::InsufficientFunds` if a debit exceeds the balance.
    /// - `CommitError::TransactionFailed` for any other rejection or store fault.
    /// - `CommitError::BalanceUnavailable` if the write applied but the new
    ///   balance could not be read.
    pub fn commit(
        &self,
        idempotent_key: &IdempotencyKey,
        user_id: &UserId,
        amount_text: &str,
        transaction_type: TransactionType,
    ) -> Result<Committed, CommitError> {
        let amount = Amount::parse(amount_text).map_err(|e| {
            tracing::info!(
                idempotent_key = %idempotent_key,
                amount = %amount_text,
                error = %e,
                "Rejected transaction with invalid amount"
            );
            CommitError::from(e)
        })?;

        let now = Utc::now();
        let entry = LedgerEntry::completed(
            idempotent_key.clone(),
            user_id.clone(),
            amount,
            transaction_type,
            now,
        );
        let ops = [
            WriteOp::InsertEntry(entry.clone()),
            WriteOp::AdjustBalance(BalanceAdjustment {
                user_id: user_id.clone(),
                direction: transaction_type,
                amount,
                updated_at: now,
            }),
        ];

        let outcome = self.store.submit(&ops).map_err(|e| {
            tracing::error!(
                idempotent_key = %idempotent_key,
                user_id = %user_id,
                error = %e,
                "Transaction failed"
            );
            CommitError::TransactionFailed {
                reason: e.to_string(),
            }
        })?;

        if let WriteOutcome::Rejected(statuses) = outcome {
            let err = classify(idempotent_key, user_id, &statuses);
            match &err {
                CommitError::TransactionFailed { reason } => tracing::error!(
                    idempotent_key = %idempotent_key,
                    user_id = %user_id,
                    reason = %reason,
                    "Transaction rejected"
                ),
                other => tracing::warn!(
                    idempotent_key = %idempotent_key,
                    user_id = %user_id,
                    error = %other,
                    "Transaction rejected"
                ),
            }
            return Err(err);
        }

        let balance = self
            .reader
            .get_balance(user_id)
            .map_err(|source| CommitError::BalanceUnavailable {
                idempotent_key: idempotent_key.clone(),
                source,
            })?;

        tracing::info!(
            idempotent_key = %idempotent_key,
            user_id = %user_id,
            transaction_type = %transaction_type,
            amount = %amount,
            new_balance = %balance.balance,
            "Transaction committed"
        );

        Ok(Committed {
            entry,
            new_balance: balance.balance,
        })
    }
}

/// Map per-operation statuses to one error, ledger insert first.
fn classify(
    idempotent_key: &IdempotencyKey,
    user_id: &UserId,
    statuses: &[OperationStatus],
) -> CommitError {
    if statuses.get(LEDGER_INSERT) == Some(&OperationStatus::ConditionFailed) {
        return CommitError::DuplicateTransaction {
            idempotent_key: idempotent_key.clone(),
        };
    }
    if statuses.get(BALANCE_UPDATE) == Some(&OperationStatus::ConditionFailed) {
        return CommitError::InsufficientFunds {
            user_id: user_id.clone(),
        };
    }

    let reasons: Vec<String> = statuses
        .iter()
        .enumerate()
        .filter_map(|(i, status)| match status {
            OperationStatus::Applied => None,
            OperationStatus::ConditionFailed => Some(format!("operation {i}: condition failed")),
            OperationStatus::OtherFailure(reason) => Some(format!("operation {i}: {reason}")),
        })
        .collect();

    CommitError::TransactionFailed {
        reason: if reasons.is_empty() {
            "transaction rejected".to_string()
        } else {
            reasons.join("; ")
        },
    }
}
