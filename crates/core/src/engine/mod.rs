//! The orchestrating ledger engine.
//!
//! `LedgerEngine` is the only code path that mutates ledger state (stock
//! quantities, average costs, wallet balances). It loads versioned rows
//! from the store, runs the pure domain services, and commits validated
//! write-sets atomically under optimistic per-row versioning. Concurrent
//! posts against the same entity serialize: one commits, the other fails
//! with a retryable `ConcurrentModification`.

pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use error::EngineError;
pub use service::LedgerEngine;
pub use store::{MemoryLedgerStore, StoreError, Versioned, WriteSet};
pub use types::{JournalAccountMap, OrganizationProfile};
