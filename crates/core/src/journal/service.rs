//! Journal validation service.
//!
//! Pure business logic with no storage dependency: account data is supplied
//! through a lookup closure by the caller.

use std::collections::HashSet;

use merx_shared::types::AccountId;

use crate::journal::account::Account;
use crate::journal::error::JournalError;
use crate::journal::types::{JournalEntry, JournalTotals};

/// Journal validation service.
pub struct JournalService;

impl JournalService {
    /// Validates a journal entry for posting.
    ///
    /// Checks performed:
    /// 1. At least two lines
    /// 2. Every line carries exactly one positive side
    /// 3. Every line's account exists, is active, and belongs to the
    ///    entry's organization
    /// 4. Σ debit = Σ credit, exactly
    ///
    /// Posting is all-lines-or-none; any failure rejects the whole entry.
    ///
    /// # Errors
    ///
    /// Returns `JournalError` describing the first violated rule.
    pub fn validate_entry<F>(
        entry: &JournalEntry,
        account_lookup: F,
    ) -> Result<JournalTotals, JournalError>
    where
        F: Fn(AccountId) -> Option<Account>,
    {
        if entry.lines.len() < 2 {
            return Err(JournalError::InsufficientLines);
        }

        for line in &entry.lines {
            if !line.is_single_sided() {
                return Err(JournalError::InvalidLine);
            }

            let account = account_lookup(line.account_id)
                .ok_or(JournalError::InvalidAccount(line.account_id))?;
            if !account.is_active || account.organization_id != entry.organization_id {
                return Err(JournalError::InvalidAccount(line.account_id));
            }
        }

        let totals = entry.totals();
        if !totals.is_balanced {
            return Err(JournalError::Unbalanced {
                debit: totals.total_debit,
                credit: totals.total_credit,
            });
        }

        Ok(totals)
    }

    /// Validates an account's parent chain at registration time.
    ///
    /// The parent must exist in the same organization and the chain up from
    /// it must not pass through the account itself.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::ParentAccountNotFound` or
    /// `JournalError::AccountCycle`.
    pub fn validate_parent_chain<F>(account: &Account, account_lookup: F) -> Result<(), JournalError>
    where
        F: Fn(AccountId) -> Option<Account>,
    {
        let Some(parent_id) = account.parent_account_id else {
            return Ok(());
        };

        let mut visited = HashSet::new();
        visited.insert(account.id);

        let mut cursor = parent_id;
        loop {
            if !visited.insert(cursor) {
                return Err(JournalError::AccountCycle(cursor));
            }

            let parent = account_lookup(cursor)
                .filter(|parent| parent.organization_id == account.organization_id)
                .ok_or(JournalError::ParentAccountNotFound(cursor))?;

            match parent.parent_account_id {
                Some(next) => cursor = next,
                None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use merx_shared::types::{OrganizationId, UserId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    use crate::journal::account::AccountType;
    use crate::journal::types::{CreateJournalEntryInput, JournalLineInput};

    struct Fixture {
        org: OrganizationId,
        accounts: HashMap<AccountId, Account>,
        cash: AccountId,
        revenue: AccountId,
    }

    impl Fixture {
        fn new() -> Self {
            let org = OrganizationId::new();
            let cash = Account::new(org, "1000", "Cash", AccountType::Asset, None);
            let revenue = Account::new(org, "4000", "Sales", AccountType::Revenue, None);
            let cash_id = cash.id;
            let revenue_id = revenue.id;

            let mut accounts = HashMap::new();
            accounts.insert(cash_id, cash);
            accounts.insert(revenue_id, revenue);

            Self {
                org,
                accounts,
                cash: cash_id,
                revenue: revenue_id,
            }
        }

        fn lookup(&self) -> impl Fn(AccountId) -> Option<Account> + '_ {
            |id| self.accounts.get(&id).cloned()
        }

        fn entry(&self, lines: Vec<JournalLineInput>) -> JournalEntry {
            CreateJournalEntryInput {
                organization_id: self.org,
                entry_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                description: "Cash sale".to_string(),
                reference: None,
                lines,
                created_by: UserId::new(),
            }
            .into_draft(Utc::now())
        }
    }

    fn debit(account_id: AccountId, amount: Decimal) -> JournalLineInput {
        JournalLineInput {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            memo: None,
        }
    }

    fn credit(account_id: AccountId, amount: Decimal) -> JournalLineInput {
        JournalLineInput {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            memo: None,
        }
    }

    #[test]
    fn test_balanced_entry_accepted() {
        let fixture = Fixture::new();
        let entry = fixture.entry(vec![
            debit(fixture.cash, dec!(100.00)),
            credit(fixture.revenue, dec!(100.00)),
        ]);

        let totals = JournalService::validate_entry(&entry, fixture.lookup()).unwrap();
        assert!(totals.is_balanced);
        assert_eq!(totals.total_debit, dec!(100.00));
    }

    #[test]
    fn test_unbalanced_entry_rejected() {
        let fixture = Fixture::new();
        let entry = fixture.entry(vec![
            debit(fixture.cash, dec!(100.00)),
            credit(fixture.revenue, dec!(90.00)),
        ]);

        let err = JournalService::validate_entry(&entry, fixture.lookup()).unwrap_err();
        assert!(matches!(err, JournalError::Unbalanced { .. }));
    }

    #[test]
    fn test_single_line_rejected() {
        let fixture = Fixture::new();
        let entry = fixture.entry(vec![debit(fixture.cash, dec!(100.00))]);

        let err = JournalService::validate_entry(&entry, fixture.lookup()).unwrap_err();
        assert!(matches!(err, JournalError::InsufficientLines));
    }

    #[test]
    fn test_line_with_both_sides_rejected() {
        let fixture = Fixture::new();
        let entry = fixture.entry(vec![
            JournalLineInput {
                account_id: fixture.cash,
                debit: dec!(50.00),
                credit: dec!(50.00),
                memo: None,
            },
            credit(fixture.revenue, dec!(0)),
        ]);

        let err = JournalService::validate_entry(&entry, fixture.lookup()).unwrap_err();
        assert!(matches!(err, JournalError::InvalidLine));
    }

    #[test]
    fn test_negative_line_rejected() {
        let fixture = Fixture::new();
        let entry = fixture.entry(vec![
            JournalLineInput {
                account_id: fixture.cash,
                debit: dec!(-100.00),
                credit: Decimal::ZERO,
                memo: None,
            },
            credit(fixture.revenue, dec!(-100.00)),
        ]);

        let err = JournalService::validate_entry(&entry, fixture.lookup()).unwrap_err();
        assert!(matches!(err, JournalError::InvalidLine));
    }

    #[test]
    fn test_unknown_account_rejected() {
        let fixture = Fixture::new();
        let ghost = AccountId::new();
        let entry = fixture.entry(vec![
            debit(ghost, dec!(100.00)),
            credit(fixture.revenue, dec!(100.00)),
        ]);

        let err = JournalService::validate_entry(&entry, fixture.lookup()).unwrap_err();
        assert!(matches!(err, JournalError::InvalidAccount(id) if id == ghost));
    }

    #[test]
    fn test_inactive_account_rejected() {
        let mut fixture = Fixture::new();
        fixture.accounts.get_mut(&fixture.cash).unwrap().is_active = false;

        let entry = fixture.entry(vec![
            debit(fixture.cash, dec!(100.00)),
            credit(fixture.revenue, dec!(100.00)),
        ]);

        let err = JournalService::validate_entry(&entry, fixture.lookup()).unwrap_err();
        assert!(matches!(err, JournalError::InvalidAccount(_)));
    }

    #[test]
    fn test_cross_tenant_account_rejected() {
        let mut fixture = Fixture::new();
        let foreign = Account::new(
            OrganizationId::new(),
            "1000",
            "Foreign Cash",
            AccountType::Asset,
            None,
        );
        let foreign_id = foreign.id;
        fixture.accounts.insert(foreign_id, foreign);

        let entry = fixture.entry(vec![
            debit(foreign_id, dec!(100.00)),
            credit(fixture.revenue, dec!(100.00)),
        ]);

        let err = JournalService::validate_entry(&entry, fixture.lookup()).unwrap_err();
        assert!(matches!(err, JournalError::InvalidAccount(id) if id == foreign_id));
    }

    #[test]
    fn test_multi_line_balanced_entry() {
        let fixture = Fixture::new();
        let entry = fixture.entry(vec![
            debit(fixture.cash, dec!(60.00)),
            debit(fixture.cash, dec!(40.00)),
            credit(fixture.revenue, dec!(100.00)),
        ]);

        let totals = JournalService::validate_entry(&entry, fixture.lookup()).unwrap();
        assert!(totals.is_balanced);
    }

    #[test]
    fn test_parent_chain_ok() {
        let fixture = Fixture::new();
        let child = Account::new(
            fixture.org,
            "1010",
            "Petty Cash",
            AccountType::Asset,
            Some(fixture.cash),
        );
        assert!(JournalService::validate_parent_chain(&child, fixture.lookup()).is_ok());
    }

    #[test]
    fn test_parent_missing() {
        let fixture = Fixture::new();
        let orphan_parent = AccountId::new();
        let child = Account::new(
            fixture.org,
            "1010",
            "Petty Cash",
            AccountType::Asset,
            Some(orphan_parent),
        );

        let err = JournalService::validate_parent_chain(&child, fixture.lookup()).unwrap_err();
        assert!(matches!(err, JournalError::ParentAccountNotFound(id) if id == orphan_parent));
    }

    #[test]
    fn test_parent_cycle_detected() {
        let mut fixture = Fixture::new();
        // Point cash's parent at a child that points back at cash.
        let mut child = Account::new(
            fixture.org,
            "1010",
            "Petty Cash",
            AccountType::Asset,
            Some(fixture.cash),
        );
        let child_id = child.id;
        fixture.accounts.get_mut(&fixture.cash).unwrap().parent_account_id = Some(child_id);
        child.parent_account_id = Some(fixture.cash);
        fixture.accounts.insert(child_id, child.clone());

        let err = JournalService::validate_parent_chain(&child, fixture.lookup()).unwrap_err();
        assert!(matches!(err, JournalError::AccountCycle(_)));
    }

    #[test]
    fn test_cross_tenant_parent_rejected() {
        let mut fixture = Fixture::new();
        let foreign = Account::new(
            OrganizationId::new(),
            "9000",
            "Foreign",
            AccountType::Asset,
            None,
        );
        let foreign_id = foreign.id;
        fixture.accounts.insert(foreign_id, foreign);

        let child = Account::new(
            fixture.org,
            "1010",
            "Petty Cash",
            AccountType::Asset,
            Some(foreign_id),
        );

        let err = JournalService::validate_parent_chain(&child, fixture.lookup()).unwrap_err();
        assert!(matches!(err, JournalError::ParentAccountNotFound(_)));
    }
}
