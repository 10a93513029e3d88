//! Store doubles for unit tests.

use std::sync::Mutex;

use ledger_core::{BalanceRecord, IdempotencyKey, LedgerEntry, UserId};
use ledger_store::{Result, Store, StoreError, WriteOp, WriteOutcome};

/// A store whose answers are fixed up front.
pub struct ScriptedStore {
    pub balance: Option<BalanceRecord>,
    pub fail_reads: bool,
    pub submit_result: fn() -> Result<WriteOutcome>,
    pub submitted: Mutex<Vec<Vec<WriteOp>>>,
}

impl ScriptedStore {
    pub fn with_submit(submit_result: fn() -> Result<WriteOutcome>) -> Self {
        Self {
            balance: None,
            fail_reads: false,
            submit_result,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::with_submit(|| Ok(WriteOutcome::Applied))
        }
    }

    pub fn submissions(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

impl Store for ScriptedStore {
    fn get_balance_record(&self, _user_id: &UserId) -> Result<Option<BalanceRecord>> {
        if self.fail_reads {
            return Err(StoreError::Database("connection reset".into()));
        }
        Ok(self.balance.clone())
    }

    fn get_ledger_entry(&self, _key: &IdempotencyKey) -> Result<Option<LedgerEntry>> {
        Ok(None)
    }

    fn list_entries_by_user(
        &self,
        _user_id: &UserId,
        _limit: usize,
        _offset: usize,
    ) -> Result<Vec<LedgerEntry>> {
        Ok(Vec::new())
    }

    fn submit(&self, ops: &[WriteOp]) -> Result<WriteOutcome> {
        self.submitted.lock().unwrap().push(ops.to_vec());
        (self.submit_result)()
    }
}
