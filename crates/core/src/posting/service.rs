//! Posting service for document state transitions.
//!
//! This module implements the state machine shared by every ledger-affecting
//! document type. Timestamps and actors are explicit parameters so the
//! engine stays deterministic and testable.

use chrono::{DateTime, Utc};
use merx_shared::types::UserId;

use crate::posting::error::PostingError;
use crate::posting::types::{DocumentStatus, Postable, PostingAction};

/// Stateless service for managing document posting transitions.
pub struct PostingService;

impl PostingService {
    /// Post a draft document.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the document
    /// * `posted_by` - The user posting the document
    /// * `now` - The posting timestamp
    ///
    /// # Returns
    /// * `Ok(PostingAction::Post)` if the transition is valid
    /// * `Err(PostingError::InvalidState)` if not in Draft status
    pub fn post(
        current_status: DocumentStatus,
        posted_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<PostingAction, PostingError> {
        match current_status {
            DocumentStatus::Draft => Ok(PostingAction::Post {
                posted_by,
                posted_at: now,
            }),
            _ => Err(PostingError::InvalidState {
                from: current_status,
                to: DocumentStatus::Posted,
            }),
        }
    }

    /// Reject a draft document.
    ///
    /// Rejection is terminal and never touches ledger balances.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the document
    /// * `rejected_by` - The user rejecting the document
    /// * `now` - The rejection timestamp
    /// * `reason` - The reason for rejection (required)
    ///
    /// # Returns
    /// * `Ok(PostingAction::Reject)` if the transition is valid
    /// * `Err(PostingError::InvalidState)` if not in Draft status
    /// * `Err(PostingError::RejectionReasonRequired)` if reason is empty
    pub fn reject(
        current_status: DocumentStatus,
        rejected_by: UserId,
        now: DateTime<Utc>,
        reason: String,
    ) -> Result<PostingAction, PostingError> {
        if reason.trim().is_empty() {
            return Err(PostingError::RejectionReasonRequired);
        }

        match current_status {
            DocumentStatus::Draft => Ok(PostingAction::Reject {
                rejected_by,
                rejected_at: now,
                reason,
            }),
            _ => Err(PostingError::InvalidState {
                from: current_status,
                to: DocumentStatus::Rejected,
            }),
        }
    }

    /// Validates and applies a post transition to a document in place.
    ///
    /// The caller is responsible for running the document's ledger mutation
    /// in the same atomic commit as the returned flag change.
    pub fn post_document<D: Postable>(
        doc: &mut D,
        posted_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<PostingAction, PostingError> {
        let action = Self::post(doc.status(), posted_by, now)?;
        doc.posting_mut().apply(&action);
        Ok(action)
    }

    /// Validates and applies a reject transition to a document in place.
    pub fn reject_document<D: Postable>(
        doc: &mut D,
        rejected_by: UserId,
        now: DateTime<Utc>,
        reason: String,
    ) -> Result<PostingAction, PostingError> {
        let action = Self::reject(doc.status(), rejected_by, now, reason)?;
        doc.posting_mut().apply(&action);
        Ok(action)
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Draft → Posted (post)
    /// - Draft → Rejected (reject)
    #[must_use]
    pub fn is_valid_transition(from: DocumentStatus, to: DocumentStatus) -> bool {
        matches!(
            (from, to),
            (
                DocumentStatus::Draft,
                DocumentStatus::Posted | DocumentStatus::Rejected
            )
        )
    }
}
