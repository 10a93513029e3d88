//! Error types for ledger storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Faults raised by a storage backend.
///
/// Conditional-write rejections are not errors; they are reported through
/// [`WriteOutcome::Rejected`](crate::WriteOutcome::Rejected).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}
