//! Inventory audit error types.

use thiserror::Error;

use crate::audit::types::AuditStatus;

/// Errors that can occur during inventory audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Attempted an invalid status transition.
    #[error("Invalid audit transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: AuditStatus,
        /// The attempted target status.
        to: AuditStatus,
    },

    /// Counts can only be recorded while the audit is in progress.
    #[error("Audit is {status}, counts can only be recorded while in progress")]
    NotInProgress {
        /// The audit's current status.
        status: AuditStatus,
    },

    /// A physical count cannot be negative.
    #[error("Counted stock cannot be negative")]
    NegativeCount,

    /// The item does not belong to the audit.
    #[error("Item does not belong to this audit")]
    ItemNotInAudit,

    /// Completion requires every item to be counted.
    #[error("Audit has {uncounted} uncounted item(s)")]
    IncompleteCount {
        /// Number of items still missing a count.
        uncounted: usize,
    },
}

impl AuditError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_AUDIT_TRANSITION",
            Self::NotInProgress { .. } => "AUDIT_NOT_IN_PROGRESS",
            Self::NegativeCount => "NEGATIVE_COUNT",
            Self::ItemNotInAudit => "ITEM_NOT_IN_AUDIT",
            Self::IncompleteCount { .. } => "INCOMPLETE_COUNT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AuditError::InvalidTransition {
                from: AuditStatus::Completed,
                to: AuditStatus::InProgress,
            }
            .error_code(),
            "INVALID_AUDIT_TRANSITION"
        );
        assert_eq!(
            AuditError::IncompleteCount { uncounted: 3 }.error_code(),
            "INCOMPLETE_COUNT"
        );
    }

    #[test]
    fn test_incomplete_count_display() {
        let err = AuditError::IncompleteCount { uncounted: 3 };
        assert_eq!(err.to_string(), "Audit has 3 uncounted item(s)");
    }
}
