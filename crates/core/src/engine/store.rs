//! In-memory versioned ledger store.
//!
//! Every row carries a version counter; a commit applies a validated
//! write-set atomically, failing wholesale on any version conflict. Reads
//! are lock-free clones; only commits and registrations serialize on the
//! commit guard. A durable implementation replaces this store behind the
//! same commit semantics (row versions + atomic write-sets).

use dashmap::DashMap;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use merx_shared::types::{
    AccountId, InventoryAuditId, InventoryAuditItemId, JournalEntryId, OrganizationId, ReceiptId,
    StockMovementId, VariantId, WalletId, WalletTransactionId,
};

use crate::audit::{InventoryAudit, InventoryAuditItem};
use crate::engine::types::OrganizationProfile;
use crate::journal::{Account, JournalEntry};
use crate::stock::{ProductVariant, StockMovement};
use crate::wallet::{Receipt, Wallet, WalletTransaction};

/// A stored record with its optimistic version.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    /// Version counter, starting at 1 and incremented on every commit.
    pub version: u64,
    /// The record itself.
    pub record: T,
}

/// Errors raised by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity.
        entity: &'static str,
        /// The row's identifier.
        id: Uuid,
    },

    /// A row with this identifier already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// The kind of entity.
        entity: &'static str,
        /// The row's identifier.
        id: Uuid,
    },

    /// The row changed since it was read.
    #[error("Version conflict on {entity} {id}")]
    VersionConflict {
        /// The kind of entity.
        entity: &'static str,
        /// The row's identifier.
        id: Uuid,
    },
}

/// One pending write.
enum Write<T> {
    Insert(T),
    Update { expected_version: u64, record: T },
}

type Pending<K, T> = Vec<(K, Uuid, Write<T>)>;

/// A validated-then-applied atomic set of writes.
///
/// All version checks run before any write lands; a conflict anywhere
/// aborts the whole set.
#[derive(Default)]
pub struct WriteSet {
    variants: Pending<VariantId, ProductVariant>,
    movements: Pending<StockMovementId, StockMovement>,
    wallets: Pending<WalletId, Wallet>,
    wallet_transactions: Pending<WalletTransactionId, WalletTransaction>,
    receipts: Pending<ReceiptId, Receipt>,
    audits: Pending<InventoryAuditId, InventoryAudit>,
    audit_items: Pending<InventoryAuditItemId, InventoryAuditItem>,
    journal_entries: Pending<JournalEntryId, JournalEntry>,
}

macro_rules! writeset_ops {
    ($insert:ident, $update:ident, $field:ident, $record_ty:ty) => {
        /// Queues an insert of a new row.
        pub fn $insert(&mut self, record: $record_ty) {
            self.$field
                .push((record.id, record.id.into_inner(), Write::Insert(record)));
        }

        /// Queues an update of an existing row at the expected version.
        pub fn $update(&mut self, expected_version: u64, record: $record_ty) {
            self.$field.push((
                record.id,
                record.id.into_inner(),
                Write::Update {
                    expected_version,
                    record,
                },
            ));
        }
    };
}

impl WriteSet {
    writeset_ops!(insert_variant, update_variant, variants, ProductVariant);
    writeset_ops!(insert_movement, update_movement, movements, StockMovement);
    writeset_ops!(insert_wallet, update_wallet, wallets, Wallet);
    writeset_ops!(
        insert_wallet_transaction,
        update_wallet_transaction,
        wallet_transactions,
        WalletTransaction
    );
    writeset_ops!(insert_receipt, update_receipt, receipts, Receipt);
    writeset_ops!(insert_audit, update_audit, audits, InventoryAudit);
    writeset_ops!(
        insert_audit_item,
        update_audit_item,
        audit_items,
        InventoryAuditItem
    );
    writeset_ops!(
        insert_journal_entry,
        update_journal_entry,
        journal_entries,
        JournalEntry
    );
}

fn check_write<K, T>(
    map: &DashMap<K, Versioned<T>>,
    id: &K,
    raw: Uuid,
    write: &Write<T>,
    entity: &'static str,
) -> Result<(), StoreError>
where
    K: Eq + std::hash::Hash,
{
    match write {
        Write::Insert(_) => {
            if map.contains_key(id) {
                return Err(StoreError::AlreadyExists { entity, id: raw });
            }
            Ok(())
        }
        Write::Update {
            expected_version, ..
        } => match map.get(id) {
            None => Err(StoreError::NotFound { entity, id: raw }),
            Some(current) if current.version != *expected_version => {
                Err(StoreError::VersionConflict { entity, id: raw })
            }
            Some(_) => Ok(()),
        },
    }
}

fn apply_write<K, T>(map: &DashMap<K, Versioned<T>>, id: K, write: Write<T>)
where
    K: Eq + std::hash::Hash,
{
    match write {
        Write::Insert(record) => {
            map.insert(id, Versioned { version: 1, record });
        }
        Write::Update {
            expected_version,
            record,
        } => {
            map.insert(
                id,
                Versioned {
                    version: expected_version + 1,
                    record,
                },
            );
        }
    }
}

/// The in-memory versioned ledger store.
#[derive(Default)]
pub struct MemoryLedgerStore {
    organizations: DashMap<OrganizationId, OrganizationProfile>,
    variants: DashMap<VariantId, Versioned<ProductVariant>>,
    movements: DashMap<StockMovementId, Versioned<StockMovement>>,
    wallets: DashMap<WalletId, Versioned<Wallet>>,
    wallet_transactions: DashMap<WalletTransactionId, Versioned<WalletTransaction>>,
    receipts: DashMap<ReceiptId, Versioned<Receipt>>,
    audits: DashMap<InventoryAuditId, Versioned<InventoryAudit>>,
    audit_items: DashMap<InventoryAuditItemId, Versioned<InventoryAuditItem>>,
    accounts: DashMap<AccountId, Versioned<Account>>,
    journal_entries: DashMap<JournalEntryId, Versioned<JournalEntry>>,
    commit_lock: Mutex<()>,
}

macro_rules! store_entity {
    ($get:ident, $insert:ident, $field:ident, $id_ty:ty, $record_ty:ty, $entity:literal) => {
        /// Loads a versioned record by id.
        #[must_use]
        pub fn $get(&self, id: $id_ty) -> Option<Versioned<$record_ty>> {
            self.$field.get(&id).map(|row| row.value().clone())
        }

        /// Registers a new row outside a posting commit.
        pub fn $insert(&self, record: $record_ty) -> Result<(), StoreError> {
            let _guard = self
                .commit_lock
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if self.$field.contains_key(&record.id) {
                return Err(StoreError::AlreadyExists {
                    entity: $entity,
                    id: record.id.into_inner(),
                });
            }
            self.$field.insert(record.id, Versioned { version: 1, record });
            Ok(())
        }
    };
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    store_entity!(
        get_variant,
        insert_variant,
        variants,
        VariantId,
        ProductVariant,
        "product variant"
    );
    store_entity!(
        get_movement,
        insert_movement,
        movements,
        StockMovementId,
        StockMovement,
        "stock movement"
    );
    store_entity!(get_wallet, insert_wallet, wallets, WalletId, Wallet, "wallet");
    store_entity!(
        get_wallet_transaction,
        insert_wallet_transaction,
        wallet_transactions,
        WalletTransactionId,
        WalletTransaction,
        "wallet transaction"
    );
    store_entity!(
        get_receipt,
        insert_receipt,
        receipts,
        ReceiptId,
        Receipt,
        "receipt"
    );
    store_entity!(
        get_audit,
        insert_audit,
        audits,
        InventoryAuditId,
        InventoryAudit,
        "inventory audit"
    );
    store_entity!(
        get_audit_item,
        insert_audit_item,
        audit_items,
        InventoryAuditItemId,
        InventoryAuditItem,
        "inventory audit item"
    );
    store_entity!(
        get_account,
        insert_account,
        accounts,
        AccountId,
        Account,
        "account"
    );
    store_entity!(
        get_journal_entry,
        insert_journal_entry,
        journal_entries,
        JournalEntryId,
        JournalEntry,
        "journal entry"
    );

    /// Loads an organization profile.
    #[must_use]
    pub fn organization(&self, id: OrganizationId) -> Option<OrganizationProfile> {
        self.organizations.get(&id).map(|row| row.value().clone())
    }

    /// Registers a new organization profile.
    pub fn insert_organization(&self, profile: OrganizationProfile) -> Result<(), StoreError> {
        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if self.organizations.contains_key(&profile.id) {
            return Err(StoreError::AlreadyExists {
                entity: "organization",
                id: profile.id.into_inner(),
            });
        }
        self.organizations.insert(profile.id, profile);
        Ok(())
    }

    /// Replaces an organization profile (settings changes).
    pub fn update_organization(&self, profile: OrganizationProfile) -> Result<(), StoreError> {
        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !self.organizations.contains_key(&profile.id) {
            return Err(StoreError::NotFound {
                entity: "organization",
                id: profile.id.into_inner(),
            });
        }
        self.organizations.insert(profile.id, profile);
        Ok(())
    }

    /// Returns a consistent snapshot of an organization's variants.
    ///
    /// Taken under the commit guard, so no posting commit can interleave
    /// with the snapshot.
    #[must_use]
    pub fn snapshot_variants(&self, organization_id: OrganizationId) -> Vec<ProductVariant> {
        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut snapshot: Vec<ProductVariant> = self
            .variants
            .iter()
            .filter(|row| row.value().record.organization_id == organization_id)
            .map(|row| row.value().record.clone())
            .collect();
        snapshot.sort_by_key(|variant| variant.id);
        snapshot
    }

    /// Returns all items of an audit, ordered by id.
    #[must_use]
    pub fn items_for_audit(
        &self,
        audit_id: InventoryAuditId,
    ) -> Vec<Versioned<InventoryAuditItem>> {
        let mut items: Vec<Versioned<InventoryAuditItem>> = self
            .audit_items
            .iter()
            .filter(|row| row.value().record.audit_id == audit_id)
            .map(|row| row.value().clone())
            .collect();
        items.sort_by_key(|item| item.record.id);
        items
    }

    /// Returns an organization's journal entries, ordered by id.
    #[must_use]
    pub fn journal_entries_for(&self, organization_id: OrganizationId) -> Vec<JournalEntry> {
        let mut entries: Vec<JournalEntry> = self
            .journal_entries
            .iter()
            .filter(|row| row.value().record.organization_id == organization_id)
            .map(|row| row.value().record.clone())
            .collect();
        entries.sort_by_key(|entry| entry.id);
        entries
    }

    /// Returns true if an account code is already used in the organization.
    #[must_use]
    pub fn account_code_in_use(&self, organization_id: OrganizationId, code: &str) -> bool {
        self.accounts.iter().any(|row| {
            let account = &row.value().record;
            account.organization_id == organization_id && account.account_code == code
        })
    }

    /// Validates and applies a write-set atomically.
    ///
    /// # Errors
    ///
    /// Returns the first `StoreError` found during validation; in that case
    /// nothing is written.
    pub fn commit(&self, writes: WriteSet) -> Result<(), StoreError> {
        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        for (id, raw, write) in &writes.variants {
            check_write(&self.variants, id, *raw, write, "product variant")?;
        }
        for (id, raw, write) in &writes.movements {
            check_write(&self.movements, id, *raw, write, "stock movement")?;
        }
        for (id, raw, write) in &writes.wallets {
            check_write(&self.wallets, id, *raw, write, "wallet")?;
        }
        for (id, raw, write) in &writes.wallet_transactions {
            check_write(
                &self.wallet_transactions,
                id,
                *raw,
                write,
                "wallet transaction",
            )?;
        }
        for (id, raw, write) in &writes.receipts {
            check_write(&self.receipts, id, *raw, write, "receipt")?;
        }
        for (id, raw, write) in &writes.audits {
            check_write(&self.audits, id, *raw, write, "inventory audit")?;
        }
        for (id, raw, write) in &writes.audit_items {
            check_write(&self.audit_items, id, *raw, write, "inventory audit item")?;
        }
        for (id, raw, write) in &writes.journal_entries {
            check_write(&self.journal_entries, id, *raw, write, "journal entry")?;
        }

        for (id, _, write) in writes.variants {
            apply_write(&self.variants, id, write);
        }
        for (id, _, write) in writes.movements {
            apply_write(&self.movements, id, write);
        }
        for (id, _, write) in writes.wallets {
            apply_write(&self.wallets, id, write);
        }
        for (id, _, write) in writes.wallet_transactions {
            apply_write(&self.wallet_transactions, id, write);
        }
        for (id, _, write) in writes.receipts {
            apply_write(&self.receipts, id, write);
        }
        for (id, _, write) in writes.audits {
            apply_write(&self.audits, id, write);
        }
        for (id, _, write) in writes.audit_items {
            apply_write(&self.audit_items, id, write);
        }
        for (id, _, write) in writes.journal_entries {
            apply_write(&self.journal_entries, id, write);
        }

        Ok(())
    }
}
