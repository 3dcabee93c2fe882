//! Chart of accounts entries.

use merx_shared::types::{AccountId, OrganizationId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account type classification.
///
/// In double-entry bookkeeping:
/// - Asset/Expense accounts are debit-normal
/// - Liability/Equity/Revenue accounts are credit-normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, inventory, receivables).
    Asset,
    /// Obligations owed (payables, customer wallet liabilities).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// Returns the string representation of the account type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses an account type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Returns true for debit-normal account types.
    ///
    /// Debit-normal: balance increases with debits (Asset, Expense).
    /// Credit-normal: balance increases with credits (Liability, Equity,
    /// Revenue).
    #[must_use]
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chart of accounts entry.
///
/// Accounts form a tree per organization via `parent_account_id`; the tree
/// is validated cycle-free on registration. `account_code` is unique per
/// organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Organization this account belongs to.
    pub organization_id: OrganizationId,
    /// Account code, unique per organization (e.g. "1200").
    pub account_code: String,
    /// Human-readable name.
    pub name: String,
    /// Account type classification.
    pub account_type: AccountType,
    /// Parent account in the tree, if any.
    pub parent_account_id: Option<AccountId>,
    /// Whether the account accepts postings.
    pub is_active: bool,
}

impl Account {
    /// Creates a new active account.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        account_code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        parent_account_id: Option<AccountId>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            organization_id,
            account_code: account_code.into(),
            name: name.into(),
            account_type,
            parent_account_id,
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AccountType::Asset, true)]
    #[case(AccountType::Expense, true)]
    #[case(AccountType::Liability, false)]
    #[case(AccountType::Equity, false)]
    #[case(AccountType::Revenue, false)]
    fn test_normal_balance_side(#[case] account_type: AccountType, #[case] debit_normal: bool) {
        assert_eq!(account_type.is_debit_normal(), debit_normal);
    }

    #[test]
    fn test_account_type_parse_roundtrip() {
        for account_type in [
            AccountType::Asset,
            AccountType::Liability,
            AccountType::Equity,
            AccountType::Revenue,
            AccountType::Expense,
        ] {
            assert_eq!(AccountType::parse(account_type.as_str()), Some(account_type));
        }
        assert_eq!(AccountType::parse("contra"), None);
    }

    #[test]
    fn test_new_account_is_active() {
        let account = Account::new(
            OrganizationId::new(),
            "1200",
            "Inventory",
            AccountType::Asset,
            None,
        );
        assert!(account.is_active);
        assert!(account.parent_account_id.is_none());
    }
}
