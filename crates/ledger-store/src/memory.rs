//! In-memory storage implementation.
//!
//! `MemoryStore` honours the same atomicity and ordering contract as the
//! `RocksDB` backend: a submission is evaluated and applied under one write lock,
//! so concurrent submissions never interleave.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ledger_core::{BalanceRecord, IdempotencyKey, LedgerEntry, UserId};

use crate::error::{Result, StoreError};
use crate::write::{evaluate, Evaluation, Mutation, StoreView, WriteOp, WriteOutcome};
use crate::Store;

#[derive(Default)]
struct Tables {
    balances: HashMap<UserId, BalanceRecord>,
    entries: HashMap<IdempotencyKey, LedgerEntry>,
    /// Keys per user in insertion order.
    entries_by_user: HashMap<UserId, Vec<IdempotencyKey>>,
}

impl Tables {
    fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::PutEntry(entry) => {
                self.entries_by_user
                    .entry(entry.user_id.clone())
                    .or_default()
                    .push(entry.idempotent_key.clone());
                self.entries.insert(entry.idempotent_key.clone(), entry);
            }
            Mutation::PutBalance(record) => {
                self.balances.insert(record.user_id.clone(), record);
            }
        }
    }
}

impl StoreView for Tables {
    fn entry_exists(&self, key: &IdempotencyKey) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn balance_record(&self, user_id: &UserId) -> Result<Option<BalanceRecord>> {
        Ok(self.balances.get(user_id).cloned())
    }
}

/// Process-local store, used by tests and the `memory` backend.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(poisoned)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Database("memory store lock poisoned".into())
}

impl Store for MemoryStore {
    fn get_balance_record(&self, user_id: &UserId) -> Result<Option<BalanceRecord>> {
        self.read()?.balance_record(user_id)
    }

    fn get_ledger_entry(&self, key: &IdempotencyKey) -> Result<Option<LedgerEntry>> {
        Ok(self.read()?.entries.get(key).cloned())
    }

    fn list_entries_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>> {
        let tables = self.read()?;
        let Some(keys) = tables.entries_by_user.get(user_id) else {
            return Ok(Vec::new());
        };

        Ok(keys
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .filter_map(|key| tables.entries.get(key).cloned())
            .collect())
    }

    fn submit(&self, ops: &[WriteOp]) -> Result<WriteOutcome> {
        let mut tables = self.write()?;

        match evaluate(ops, &*tables)? {
            Evaluation::Apply(mutations) => {
                for mutation in mutations {
                    tables.apply(mutation);
                }
                Ok(WriteOutcome::Applied)
            }
            Evaluation::Reject(statuses) => Ok(WriteOutcome::Rejected(statuses)),
        }
    }
}
