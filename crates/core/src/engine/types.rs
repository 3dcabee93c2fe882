//! Engine-level organization data.

use merx_shared::types::{AccountId, OrganizationId};
use serde::{Deserialize, Serialize};

use crate::stock::CostMethod;

/// The chart-of-accounts mapping used to mirror ledger events into journal
/// entries.
///
/// When an organization registers a mapping, posting a costed purchase or a
/// wallet transaction also synthesizes and posts the balanced journal entry
/// for it in the same commit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JournalAccountMap {
    /// Debited when costed goods are received.
    pub inventory_account_id: AccountId,
    /// Credited when costed goods are received (accrued payables).
    pub inventory_offset_account_id: AccountId,
    /// Debited on wallet deposits, credited on withdrawals.
    pub cash_account_id: AccountId,
    /// Credited on wallet deposits, debited on withdrawals.
    pub wallet_liability_account_id: AccountId,
}

/// An organization as the engine sees it.
///
/// Master data (name, settings) is owned by the surrounding platform; the
/// engine only needs the costing strategy and the optional journal mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationProfile {
    /// Unique identifier.
    pub id: OrganizationId,
    /// Organization name.
    pub name: String,
    /// Costing strategy applied to this organization's stock.
    pub cost_method: CostMethod,
    /// Journal mirroring configuration, if enabled.
    pub journal_accounts: Option<JournalAccountMap>,
}

impl OrganizationProfile {
    /// Creates a profile with no journal mirroring.
    #[must_use]
    pub fn new(name: impl Into<String>, cost_method: CostMethod) -> Self {
        Self {
            id: OrganizationId::new(),
            name: name.into(),
            cost_method,
            journal_accounts: None,
        }
    }
}
