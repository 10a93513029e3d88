//! Status classification shared by every outcome the ledger can produce.

use serde::Serialize;

/// Protocol-neutral classification of an outcome.
///
/// Transport layers translate these to their own status codes without
/// looking at the business reason behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// The operation succeeded.
    Success,

    /// The caller sent something unusable; nothing was attempted.
    BadInput,

    /// The request conflicts with current state (duplicate, insufficient funds).
    Conflict,

    /// The store or transport failed.
    ServerFault,
}
