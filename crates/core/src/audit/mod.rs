//! Physical inventory audits.
//!
//! An audit snapshots theoretical stock at one instant, collects physical
//! counts, and on completion reconciles every non-zero variance into an
//! adjustment stock movement carried at the snapshot cost.

pub mod error;
pub mod service;
pub mod types;

pub use error::AuditError;
pub use service::AuditService;
pub use types::{
    AuditScope, AuditStatus, CreateAuditInput, InventoryAudit, InventoryAuditItem,
};
