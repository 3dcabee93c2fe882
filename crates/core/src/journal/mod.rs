//! Chart of accounts and double-entry journal.
//!
//! The journal is the terminal sink the other ledgers emit into. Posting a
//! journal entry is all-lines-or-none and requires the double-entry
//! invariant to hold exactly: the sum of debits equals the sum of credits.

pub mod account;
pub mod error;
pub mod service;
pub mod types;

pub use account::{Account, AccountType};
pub use error::JournalError;
pub use service::JournalService;
pub use types::{
    CreateJournalEntryInput, JournalEntry, JournalEntryLine, JournalLineInput, JournalTotals,
};
