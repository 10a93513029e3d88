//! Key encoding utilities for `RocksDB`.
//!
//! User IDs and idempotency keys are arbitrary strings, so index keys carry a
//! length prefix to keep one user's prefix from matching another's.

use chrono::{DateTime, Utc};

use ledger_core::{IdempotencyKey, UserId};

/// Create a balance key from a user ID.
#[must_use]
pub fn balance_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a ledger entry key from an idempotency key.
#[must_use]
pub fn ledger_key(key: &IdempotencyKey) -> Vec<u8> {
    key.as_bytes().to_vec()
}

/// Create a prefix for iterating all ledger entries for a user.
///
/// Format: `len(user_id) as u32 BE || user_id`
#[must_use]
pub fn user_ledger_prefix(user_id: &UserId) -> Vec<u8> {
    let bytes = user_id.as_bytes();
    let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);

    let mut prefix = Vec::with_capacity(4 + bytes.len());
    prefix.extend_from_slice(&len.to_be_bytes());
    prefix.extend_from_slice(bytes);
    prefix
}

/// Smallest key that sorts after every key starting with `prefix`.
///
/// Returns `None` when no such key exists (the prefix is all `0xFF`).
#[must_use]
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let last = prefix.iter().rposition(|&b| b != u8::MAX)?;

    let mut bound = prefix[..=last].to_vec();
    bound[last] += 1;
    Some(bound)
}

/// Create a user-ledger index key.
///
/// Format: `prefix || created_at micros as u64 BE || idempotency key`
///
/// Entries for a user therefore sort by creation time.
#[must_use]
pub fn user_ledger_key(
    user_id: &UserId,
    created_at: DateTime<Utc>,
    key: &IdempotencyKey,
) -> Vec<u8> {
    let micros = u64::try_from(created_at.timestamp_micros()).unwrap_or(0);

    let mut index_key = user_ledger_prefix(user_id);
    index_key.extend_from_slice(&micros.to_be_bytes());
    index_key.extend_from_slice(key.as_bytes());
    index_key
}
