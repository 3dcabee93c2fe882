//! Posting lifecycle shared by every ledger-affecting document type.
//!
//! Stock movements, wallet transactions, receipts, and journal entries all
//! carry the same posting shape: they start as `Draft`, and exactly one of
//! `post` or `reject` moves them to a terminal state. There is no unpost and
//! no unreject; corrections are new documents.

pub mod error;
pub mod service;
pub mod types;

pub use error::PostingError;
pub use service::PostingService;
pub use types::{DocumentStatus, Postable, PostingAction, PostingState};
