//! Posting error types for document lifecycle management.

use thiserror::Error;

use crate::posting::types::DocumentStatus;

/// Errors that can occur during posting state transitions.
#[derive(Debug, Error)]
pub enum PostingError {
    /// Attempted a transition from a non-draft state.
    #[error("Invalid state transition from {from} to {to}")]
    InvalidState {
        /// The current status.
        from: DocumentStatus,
        /// The attempted target status.
        to: DocumentStatus,
    },

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
        }
    }
}
