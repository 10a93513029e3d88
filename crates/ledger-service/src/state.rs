//! Application state.

use std::sync::Arc;

use ledger_engine::{BalanceReader, TransactionCommitter};
use ledger_store::Store;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Balance read path.
    pub reader: BalanceReader,

    /// Transaction write path.
    pub committer: TransactionCommitter,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over an opened store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        Self {
            reader: BalanceReader::new(Arc::clone(&store)),
            committer: TransactionCommitter::new(Arc::clone(&store)),
            store,
            config,
        }
    }
}
