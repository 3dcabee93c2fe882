//! Posting domain types for document lifecycle management.
//!
//! This module defines the shared posting shape carried by every
//! ledger-affecting document and the actions that transition it.

use chrono::{DateTime, Utc};
use merx_shared::types::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Document status in the posting lifecycle.
///
/// The valid transitions are:
/// - Draft → Posted (post)
/// - Draft → Rejected (reject)
///
/// Both `Posted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Document is being drafted and can be modified.
    Draft,
    /// Document has been posted to its ledger (immutable).
    Posted,
    /// Document has been rejected without ledger effect (immutable).
    Rejected,
}

impl DocumentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if the document can be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the document has reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Posted | Self::Rejected)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The posting fields shared by every ledger-affecting document.
///
/// At most one of `is_posted` / `is_rejected` is ever true. Once either is
/// true, the document's ledger-affecting fields are frozen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingState {
    /// Whether the document has been posted.
    pub is_posted: bool,
    /// When the document was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// The user who posted the document.
    pub posted_by_user_id: Option<UserId>,
    /// Whether the document has been rejected.
    pub is_rejected: bool,
    /// When the document was rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// The user who rejected the document.
    pub rejected_by_user_id: Option<UserId>,
    /// The reason for rejection.
    pub rejection_reason: Option<String>,
}

impl PostingState {
    /// Creates a fresh draft posting state.
    #[must_use]
    pub fn draft() -> Self {
        Self::default()
    }

    /// Derives the document status from the posting flags.
    #[must_use]
    pub fn status(&self) -> DocumentStatus {
        if self.is_posted {
            DocumentStatus::Posted
        } else if self.is_rejected {
            DocumentStatus::Rejected
        } else {
            DocumentStatus::Draft
        }
    }

    /// Applies a posting action, flipping the appropriate flags.
    pub fn apply(&mut self, action: &PostingAction) {
        match action {
            PostingAction::Post {
                posted_by,
                posted_at,
            } => {
                self.is_posted = true;
                self.posted_at = Some(*posted_at);
                self.posted_by_user_id = Some(*posted_by);
            }
            PostingAction::Reject {
                rejected_by,
                rejected_at,
                reason,
            } => {
                self.is_rejected = true;
                self.rejected_at = Some(*rejected_at);
                self.rejected_by_user_id = Some(*rejected_by);
                self.rejection_reason = Some(reason.clone());
            }
        }
    }
}

/// Posting action representing a state transition with audit data.
#[derive(Debug, Clone)]
pub enum PostingAction {
    /// Post a draft document to its ledger.
    Post {
        /// The user who posted the document.
        posted_by: UserId,
        /// When the document was posted.
        posted_at: DateTime<Utc>,
    },
    /// Reject a draft document without ledger effect.
    Reject {
        /// The user who rejected the document.
        rejected_by: UserId,
        /// When the document was rejected.
        rejected_at: DateTime<Utc>,
        /// The reason for rejection.
        reason: String,
    },
}

impl PostingAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> DocumentStatus {
        match self {
            Self::Post { .. } => DocumentStatus::Posted,
            Self::Reject { .. } => DocumentStatus::Rejected,
        }
    }
}

/// Capability carried by every document type that participates in posting.
///
/// Implementors expose their posting fields; the engine drives the shared
/// state machine through this trait and performs the document-specific
/// ledger mutation atomically with the flag flip.
pub trait Postable {
    /// Returns the posting state of the document.
    fn posting(&self) -> &PostingState;

    /// Returns the posting state of the document, mutably.
    fn posting_mut(&mut self) -> &mut PostingState;

    /// Derives the document status from the posting flags.
    fn status(&self) -> DocumentStatus {
        self.posting().status()
    }
}
