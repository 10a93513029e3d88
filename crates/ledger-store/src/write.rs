//! Conditional multi-item writes.
//!
//! A submission is an ordered list of [`WriteOp`]s that applies all-or-nothing.
//! Every operation carries its own precondition:
//!
//! - [`WriteOp::InsertEntry`] applies only if no entry with the same
//!   idempotency key exists.
//! - [`WriteOp::AdjustBalance`] with a credit always applies, starting from a
//!   zero balance when the user has no record yet.
//! - [`WriteOp::AdjustBalance`] with a debit applies only if the user has a
//!   record whose balance covers the amount.
//!
//! All conditions are evaluated against the state as it was before the
//! submission. If any of them fails, nothing is written and the caller gets one
//! [`OperationStatus`] per operation, in submission order.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use ledger_core::{Amount, BalanceRecord, IdempotencyKey, LedgerEntry, TransactionType, UserId};

use crate::error::Result;

/// One operation inside a conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert a ledger entry if its key is absent.
    InsertEntry(LedgerEntry),

    /// Credit or debit a user's balance.
    AdjustBalance(BalanceAdjustment),
}

/// A direction-dependent change to one balance record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceAdjustment {
    /// The user whose balance changes.
    pub user_id: UserId,
    /// Credit adds, debit subtracts.
    pub direction: TransactionType,
    /// Positive magnitude of the change.
    pub amount: Amount,
    /// Timestamp written to `updatedAt`.
    pub updated_at: DateTime<Utc>,
}

/// Per-operation result reported with a rejected submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    /// The operation's condition held. It was applied, or would have been had
    /// the rest of the submission not been rejected.
    Applied,

    /// The operation's precondition did not hold.
    ConditionFailed,

    /// The operation failed for a reason other than its precondition.
    OtherFailure(String),
}

/// Result of submitting a conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every operation applied.
    Applied,

    /// Nothing applied; one status per submitted operation, in order.
    Rejected(Vec<OperationStatus>),
}

impl WriteOutcome {
    /// Check if the submission applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Read access a backend gives the evaluator while it holds its write lock.
pub(crate) trait StoreView {
    fn entry_exists(&self, key: &IdempotencyKey) -> Result<bool>;

    fn balance_record(&self, user_id: &UserId) -> Result<Option<BalanceRecord>>;
}

/// A concrete write produced by a successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Mutation {
    PutEntry(LedgerEntry),
    PutBalance(BalanceRecord),
}

/// What a backend should do with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Evaluation {
    Apply(Vec<Mutation>),
    Reject(Vec<OperationStatus>),
}

#[derive(Hash, PartialEq, Eq)]
enum Target<'a> {
    Entry(&'a IdempotencyKey),
    Balance(&'a UserId),
}

/// Check every precondition and compute the resulting writes.
///
/// Backends must call this and apply the mutations while holding whatever
/// lock makes the pair atomic with respect to other submissions.
pub(crate) fn evaluate(ops: &[WriteOp], view: &impl StoreView) -> Result<Evaluation> {
    let mut statuses = Vec::with_capacity(ops.len());
    let mut mutations = Vec::with_capacity(ops.len());
    let mut targets = HashSet::with_capacity(ops.len());

    for op in ops {
        let target = match op {
            WriteOp::InsertEntry(entry) => Target::Entry(&entry.idempotent_key),
            WriteOp::AdjustBalance(adjustment) => Target::Balance(&adjustment.user_id),
        };
        if !targets.insert(target) {
            statuses.push(OperationStatus::OtherFailure(
                "multiple operations target the same item".into(),
            ));
            continue;
        }

        let status = match op {
            WriteOp::InsertEntry(entry) => {
                if view.entry_exists(&entry.idempotent_key)? {
                    OperationStatus::ConditionFailed
                } else {
                    mutations.push(Mutation::PutEntry(entry.clone()));
                    OperationStatus::Applied
                }
            }
            WriteOp::AdjustBalance(adjustment) => {
                let current = view.balance_record(&adjustment.user_id)?;
                match adjusted_balance(current.as_ref(), adjustment) {
                    Ok(balance) => {
                        mutations.push(Mutation::PutBalance(BalanceRecord::new(
                            adjustment.user_id.clone(),
                            balance,
                            adjustment.updated_at,
                        )));
                        OperationStatus::Applied
                    }
                    Err(status) => status,
                }
            }
        };
        statuses.push(status);
    }

    if statuses.iter().all(|s| *s == OperationStatus::Applied) {
        Ok(Evaluation::Apply(mutations))
    } else {
        Ok(Evaluation::Reject(statuses))
    }
}

fn adjusted_balance(
    current: Option<&BalanceRecord>,
    adjustment: &BalanceAdjustment,
) -> std::result::Result<Decimal, OperationStatus> {
    let amount = adjustment.amount.value();

    match adjustment.direction {
        TransactionType::Credit => {
            let existing = current.map_or(Decimal::ZERO, |record| record.balance);
            existing
                .checked_add(amount)
                .ok_or_else(|| OperationStatus::OtherFailure("balance overflow".into()))
        }
        TransactionType::Debit => match current {
            Some(record) if record.covers(adjustment.amount) => Ok(record.balance - amount),
            _ => Err(OperationStatus::ConditionFailed),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use ledger_core::{Amount, IdempotencyKey, UserId};
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct FakeView {
        entries: HashSet<IdempotencyKey>,
        balances: HashMap<UserId, BalanceRecord>,
    }

    impl StoreView for FakeView {
        fn entry_exists(&self, key: &IdempotencyKey) -> Result<bool> {
            Ok(self.entries.contains(key))
        }

        fn balance_record(&self, user_id: &UserId) -> Result<Option<BalanceRecord>> {
            Ok(self.balances.get(user_id).cloned())
        }
    }

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn key(k: &str) -> IdempotencyKey {
        IdempotencyKey::new(k).unwrap()
    }

    fn ops(k: &str, direction: TransactionType, amount: &str) -> Vec<WriteOp> {
        let amount = Amount::parse(amount).unwrap();
        let now = Utc::now();
        vec![
            WriteOp::InsertEntry(LedgerEntry::completed(key(k), user(), amount, direction, now)),
            WriteOp::AdjustBalance(BalanceAdjustment {
                user_id: user(),
                direction,
                amount,
                updated_at: now,
            }),
        ]
    }

    fn view_with_balance(balance: Decimal) -> FakeView {
        let mut view = FakeView::default();
        view.balances
            .insert(user(), BalanceRecord::new(user(), balance, Utc::now()));
        view
    }

    fn new_balance(evaluation: &Evaluation) -> Decimal {
        match evaluation {
            Evaluation::Apply(mutations) => mutations
                .iter()
                .find_map(|m| match m {
                    Mutation::PutBalance(record) => Some(record.balance),
                    Mutation::PutEntry(_) => None,
                })
                .unwrap(),
            Evaluation::Reject(statuses) => panic!("unexpected rejection: {statuses:?}"),
        }
    }

    #[test]
    fn credit_initializes_missing_record() {
        let evaluation = evaluate(
            &ops("a1", TransactionType::Credit, "100.00"),
            &FakeView::default(),
        )
        .unwrap();

        assert_eq!(new_balance(&evaluation), dec!(100.00));
    }

    #[test]
    fn debit_without_record_fails_condition() {
        let evaluation = evaluate(
            &ops("a1", TransactionType::Debit, "1"),
            &FakeView::default(),
        )
        .unwrap();

        assert_eq!(
            evaluation,
            Evaluation::Reject(vec![
                OperationStatus::Applied,
                OperationStatus::ConditionFailed
            ])
        );
    }

    #[test]
    fn debit_of_exact_balance_applies() {
        let evaluation = evaluate(
            &ops("a1", TransactionType::Debit, "100"),
            &view_with_balance(dec!(100)),
        )
        .unwrap();

        assert_eq!(new_balance(&evaluation), Decimal::ZERO);
    }

    #[test]
    fn existing_key_and_short_balance_both_reported() {
        let mut view = view_with_balance(dec!(10));
        view.entries.insert(key("a1"));

        let evaluation = evaluate(&ops("a1", TransactionType::Debit, "50"), &view).unwrap();

        assert_eq!(
            evaluation,
            Evaluation::Reject(vec![
                OperationStatus::ConditionFailed,
                OperationStatus::ConditionFailed
            ])
        );
    }

    #[test]
    fn same_item_twice_is_rejected() {
        let mut submission = ops("a1", TransactionType::Credit, "5");
        submission.push(submission[1].clone());

        let evaluation = evaluate(&submission, &FakeView::default()).unwrap();

        assert!(matches!(
            evaluation,
            Evaluation::Reject(ref s) if matches!(s[2], OperationStatus::OtherFailure(_))
        ));
    }

    #[test]
    fn credit_overflow_is_other_failure() {
        let evaluation = evaluate(
            &ops("a1", TransactionType::Credit, "1"),
            &view_with_balance(Decimal::MAX),
        )
        .unwrap();

        assert!(matches!(
            evaluation,
            Evaluation::Reject(ref s) if matches!(s[1], OperationStatus::OtherFailure(_))
        ));
    }
}
