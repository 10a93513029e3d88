//! Ledger HTTP API service.
//!
//! This crate exposes the ledger engine over HTTP:
//!
//! - Balance reads
//! - Idempotent credit/debit transactions
//! - Ledger history
//!
//! Every engine outcome carries a `StatusClass`; this crate is the only place
//! that turns those classes into HTTP status codes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers call the synchronous engine

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ServiceConfig, StoreBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
