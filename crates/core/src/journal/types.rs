//! Journal entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use merx_shared::types::{AccountId, JournalEntryId, JournalEntryLineId, OrganizationId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::posting::{Postable, PostingState};

/// A single line in a journal entry.
///
/// Exactly one of `debit` / `credit` is non-zero; both are non-negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntryLine {
    /// Unique identifier.
    pub id: JournalEntryLineId,
    /// The account this line posts to.
    pub account_id: AccountId,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Optional memo for this line.
    pub memo: Option<String>,
}

impl JournalEntryLine {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Returns true if exactly one side is positive and the other zero.
    #[must_use]
    pub fn is_single_sided(&self) -> bool {
        (self.debit > Decimal::ZERO && self.credit == Decimal::ZERO)
            || (self.credit > Decimal::ZERO && self.debit == Decimal::ZERO)
    }
}

/// Journal entry totals.
#[derive(Debug, Clone)]
pub struct JournalTotals {
    /// Sum of all debit amounts.
    pub total_debit: Decimal,
    /// Sum of all credit amounts.
    pub total_credit: Decimal,
    /// Whether debits equal credits exactly.
    pub is_balanced: bool,
}

impl JournalTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

/// A journal entry document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Organization this entry belongs to.
    pub organization_id: OrganizationId,
    /// The accounting date of the entry.
    pub entry_date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// External reference (source document, ...).
    pub reference: Option<String>,
    /// The entry's lines.
    pub lines: Vec<JournalEntryLine>,
    /// The user who created the entry.
    pub created_by: UserId,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// Posting lifecycle fields.
    pub posting: PostingState,
}

impl JournalEntry {
    /// Computes the entry's totals.
    #[must_use]
    pub fn totals(&self) -> JournalTotals {
        let total_debit: Decimal = self.lines.iter().map(|line| line.debit).sum();
        let total_credit: Decimal = self.lines.iter().map(|line| line.credit).sum();
        JournalTotals::new(total_debit, total_credit)
    }
}

impl Postable for JournalEntry {
    fn posting(&self) -> &PostingState {
        &self.posting
    }

    fn posting_mut(&mut self) -> &mut PostingState {
        &mut self.posting
    }
}

/// Input for one journal line.
#[derive(Debug, Clone)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Optional memo.
    pub memo: Option<String>,
}

/// Input for creating a new draft journal entry.
#[derive(Debug, Clone)]
pub struct CreateJournalEntryInput {
    /// The organization the entry belongs to.
    pub organization_id: OrganizationId,
    /// The accounting date of the entry.
    pub entry_date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// External reference.
    pub reference: Option<String>,
    /// The entry's lines.
    pub lines: Vec<JournalLineInput>,
    /// The user creating the entry.
    pub created_by: UserId,
}

impl CreateJournalEntryInput {
    /// Builds the draft journal entry from this input.
    #[must_use]
    pub fn into_draft(self, now: DateTime<Utc>) -> JournalEntry {
        let lines = self
            .lines
            .into_iter()
            .map(|line| JournalEntryLine {
                id: JournalEntryLineId::new(),
                account_id: line.account_id,
                debit: line.debit,
                credit: line.credit,
                memo: line.memo,
            })
            .collect();

        JournalEntry {
            id: JournalEntryId::new(),
            organization_id: self.organization_id,
            entry_date: self.entry_date,
            description: self.description,
            reference: self.reference,
            lines,
            created_by: self.created_by,
            created_at: now,
            posting: PostingState::draft(),
        }
    }
}
