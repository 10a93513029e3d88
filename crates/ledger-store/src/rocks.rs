//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//! `RocksDB` write batches are atomic but unconditional, so conditional writes
//! are serialized through a process-wide lock: preconditions are read and the
//! batch is written while the lock is held.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use ledger_core::{BalanceRecord, IdempotencyKey, LedgerEntry, UserId};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::write::{evaluate, Evaluation, Mutation, StoreView, WriteOp, WriteOutcome};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get<T: serde::de::DeserializeOwned>(&self, family: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(family)?;

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn write_mutations(&self, mutations: Vec<Mutation>) -> Result<()> {
        let cf_balances = self.cf(cf::BALANCES)?;
        let cf_ledger = self.cf(cf::LEDGER)?;
        let cf_by_user = self.cf(cf::LEDGER_BY_USER)?;

        let mut batch = WriteBatch::default();
        for mutation in mutations {
            match mutation {
                Mutation::PutEntry(entry) => {
                    let index_key = keys::user_ledger_key(
                        &entry.user_id,
                        entry.created_at,
                        &entry.idempotent_key,
                    );
                    batch.put_cf(
                        &cf_ledger,
                        keys::ledger_key(&entry.idempotent_key),
                        Self::serialize(&entry)?,
                    );
                    batch.put_cf(&cf_by_user, index_key, entry.idempotent_key.as_bytes());
                }
                Mutation::PutBalance(record) => {
                    batch.put_cf(
                        &cf_balances,
                        keys::balance_key(&record.user_id),
                        Self::serialize(&record)?,
                    );
                }
            }
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl StoreView for RocksStore {
    fn entry_exists(&self, key: &IdempotencyKey) -> Result<bool> {
        let cf = self.cf(cf::LEDGER)?;

        let exists = self
            .db
            .get_pinned_cf(&cf, keys::ledger_key(key))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();

        Ok(exists)
    }

    fn balance_record(&self, user_id: &UserId) -> Result<Option<BalanceRecord>> {
        self.get(cf::BALANCES, &keys::balance_key(user_id))
    }
}

impl Store for RocksStore {
    fn get_balance_record(&self, user_id: &UserId) -> Result<Option<BalanceRecord>> {
        self.balance_record(user_id)
    }

    fn get_ledger_entry(&self, key: &IdempotencyKey) -> Result<Option<LedgerEntry>> {
        self.get(cf::LEDGER, &keys::ledger_key(key))
    }

    fn list_entries_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>> {
        let cf_by_user = self.cf(cf::LEDGER_BY_USER)?;
        let prefix = keys::user_ledger_prefix(user_id);
        let upper = keys::prefix_upper_bound(&prefix);

        // Index keys sort oldest first; walk back from the end of the prefix.
        let mode = match &upper {
            Some(upper) => IteratorMode::From(upper, Direction::Reverse),
            None => IteratorMode::End,
        };

        let mut entries = Vec::new();
        let mut skipped = 0;
        for item in self.db.iterator_cf(&cf_by_user, mode) {
            if entries.len() >= limit {
                break;
            }

            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                // The seek may land on the bound itself.
                if upper.as_deref().is_some_and(|upper| *key >= *upper) {
                    continue;
                }
                break;
            }

            if skipped < offset {
                skipped += 1;
                continue;
            }

            if let Some(entry) = self.get(cf::LEDGER, &value)? {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    fn submit(&self, ops: &[WriteOp]) -> Result<WriteOutcome> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Database("write lock poisoned".into()))?;

        match evaluate(ops, self)? {
            Evaluation::Apply(mutations) => {
                self.write_mutations(mutations)?;
                Ok(WriteOutcome::Applied)
            }
            Evaluation::Reject(statuses) => {
                tracing::debug!(?statuses, "Conditional write rejected");
                Ok(WriteOutcome::Rejected(statuses))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ledger_core::{Amount, TransactionType};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use crate::{BalanceAdjustment, OperationStatus};

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn transaction(key: &str, direction: TransactionType, amount: &str) -> Vec<WriteOp> {
        let amount = Amount::parse(amount).unwrap();
        let now = Utc::now();
        vec![
            WriteOp::InsertEntry(LedgerEntry::completed(
                IdempotencyKey::new(key).unwrap(),
                user(),
                amount,
                direction,
                now,
            )),
            WriteOp::AdjustBalance(BalanceAdjustment {
                user_id: user(),
                direction,
                amount,
                updated_at: now,
            }),
        ]
    }

    #[test]
    fn credit_then_debit() {
        let (store, _dir) = create_test_store();

        let outcome = store
            .submit(&transaction("a1", TransactionType::Credit, "100.00"))
            .unwrap();
        assert!(outcome.is_applied());

        let outcome = store
            .submit(&transaction("a2", TransactionType::Debit, "40.00"))
            .unwrap();
        assert!(outcome.is_applied());

        let record = store.get_balance_record(&user()).unwrap().unwrap();
        assert_eq!(record.balance, dec!(60.00));
    }

    #[test]
    fn duplicate_and_insufficient_funds() {
        let (store, _dir) = create_test_store();
        store
            .submit(&transaction("a1", TransactionType::Credit, "100"))
            .unwrap();

        let duplicate = store
            .submit(&transaction("a1", TransactionType::Credit, "100"))
            .unwrap();
        assert_eq!(
            duplicate,
            WriteOutcome::Rejected(vec![
                OperationStatus::ConditionFailed,
                OperationStatus::Applied
            ])
        );

        let overdraft = store
            .submit(&transaction("a2", TransactionType::Debit, "150"))
            .unwrap();
        assert_eq!(
            overdraft,
            WriteOutcome::Rejected(vec![
                OperationStatus::Applied,
                OperationStatus::ConditionFailed
            ])
        );

        assert!(store
            .get_ledger_entry(&IdempotencyKey::new("a2").unwrap())
            .unwrap()
            .is_none());
        assert_eq!(
            store.get_balance_record(&user()).unwrap().unwrap().balance,
            dec!(100)
        );
    }

    #[test]
    fn list_entries_newest_first() {
        let (store, _dir) = create_test_store();

        store
            .submit(&transaction("a1", TransactionType::Credit, "5"))
            .unwrap();
        // Index keys have microsecond resolution.
        std::thread::sleep(std::time::Duration::from_millis(2));
        store
            .submit(&transaction("a2", TransactionType::Credit, "7"))
            .unwrap();

        let entries = store.list_entries_by_user(&user(), 10, 0).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].idempotent_key.as_str(), "a2");
        assert_eq!(entries[1].idempotent_key.as_str(), "a1");

        let page = store.list_entries_by_user(&user(), 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].idempotent_key.as_str(), "a1");
    }

    #[test]
    fn list_entries_pages_stay_within_one_user() {
        let (store, _dir) = create_test_store();
        let other = UserId::new("u2").unwrap();
        let now = Utc::now();
        store
            .submit(&[
                WriteOp::InsertEntry(LedgerEntry::completed(
                    IdempotencyKey::new("b1").unwrap(),
                    other.clone(),
                    Amount::parse("3").unwrap(),
                    TransactionType::Credit,
                    now,
                )),
                WriteOp::AdjustBalance(BalanceAdjustment {
                    user_id: other.clone(),
                    direction: TransactionType::Credit,
                    amount: Amount::parse("3").unwrap(),
                    updated_at: now,
                }),
            ])
            .unwrap();

        for key in ["a1", "a2", "a3"] {
            store
                .submit(&transaction(key, TransactionType::Credit, "1"))
                .unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let page = store.list_entries_by_user(&user(), 2, 1).unwrap();
        let keys: Vec<_> = page.iter().map(|e| e.idempotent_key.as_str()).collect();
        assert_eq!(keys, ["a2", "a1"]);

        assert!(store.list_entries_by_user(&user(), 10, 3).unwrap().is_empty());
        assert!(store.list_entries_by_user(&user(), 0, 0).unwrap().is_empty());

        let other_entries = store.list_entries_by_user(&other, 10, 0).unwrap();
        assert_eq!(other_entries.len(), 1);
        assert_eq!(other_entries[0].idempotent_key.as_str(), "b1");
    }

    #[test]
    fn reopen_preserves_state() {
        let dir = TempDir::new().unwrap();
        {
            let store = RocksStore::open(dir.path()).unwrap();
            store
                .submit(&transaction("a1", TransactionType::Credit, "12.34"))
                .unwrap();
        }

        let store = RocksStore::open(dir.path()).unwrap();
        let record = store.get_balance_record(&user()).unwrap().unwrap();
        assert_eq!(record.balance, dec!(12.34));
        let entry = store
            .get_ledger_entry(&IdempotencyKey::new("a1").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(entry.transaction_type, TransactionType::Credit);
    }
}
