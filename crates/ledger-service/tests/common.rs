//! Common test utilities for ledger integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};

use ledger_service::{create_router, AppState, ServiceConfig};
use ledger_store::MemoryStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for direct inspection.
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// Create a new test harness with an empty store.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            ..ServiceConfig::default()
        };

        let state = AppState::new(store.clone(), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store }
    }

    /// Post a transaction and return the response.
    pub async fn transact(
        &self,
        key: &str,
        user_id: &str,
        amount: &str,
        kind: &str,
    ) -> axum_test::TestResponse {
        self.server
            .post("/transact")
            .json(&json!({
                "idempotentKey": key,
                "userId": user_id,
                "amount": amount,
                "type": kind,
            }))
            .await
    }

    /// Read a user's balance as JSON.
    pub async fn balance(&self, user_id: &str) -> Value {
        self.server
            .get(&format!("/balance/{user_id}"))
            .await
            .json()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
