//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `WalletId` where a
//! `VariantId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(OrganizationId, "Unique identifier for an organization.");
typed_id!(ProductId, "Unique identifier for a product.");
typed_id!(VariantId, "Unique identifier for a product variant.");
typed_id!(LocationId, "Unique identifier for a stock location.");
typed_id!(StockMovementId, "Unique identifier for a stock movement.");
typed_id!(StockBatchId, "Unique identifier for a stock cost batch.");
typed_id!(CustomerId, "Unique identifier for a customer.");
typed_id!(WalletId, "Unique identifier for a customer wallet.");
typed_id!(
    WalletTransactionId,
    "Unique identifier for a wallet transaction."
);
typed_id!(ReceiptId, "Unique identifier for a receipt.");
typed_id!(SalesOrderId, "Unique identifier for a sales order.");
typed_id!(InventoryAuditId, "Unique identifier for an inventory audit.");
typed_id!(
    InventoryAuditItemId,
    "Unique identifier for an inventory audit item."
);
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts entry."
);
typed_id!(JournalEntryId, "Unique identifier for a journal entry.");
typed_id!(
    JournalEntryLineId,
    "Unique identifier for a journal entry line."
);
