//! Organization isolation guards.
//!
//! Every entity in the engine is owned by exactly one organization. A
//! cross-tenant reference is a programming or security error, not a user
//! mistake: it is surfaced as a fatal error and logged for audit.

use merx_shared::types::OrganizationId;
use thiserror::Error;

/// Errors raised by tenancy checks.
#[derive(Debug, Error)]
pub enum TenantError {
    /// An operation referenced an entity owned by another organization.
    #[error("Cross-tenant access to {entity}: expected organization {expected}, got {actual}")]
    CrossTenantAccess {
        /// The organization the caller operates as.
        expected: OrganizationId,
        /// The organization that owns the referenced entity.
        actual: OrganizationId,
        /// The kind of entity that was referenced.
        entity: &'static str,
    },
}

impl TenantError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CrossTenantAccess { .. } => "CROSS_TENANT_ACCESS",
        }
    }
}

/// Verifies that an entity belongs to the expected organization.
///
/// Violations are logged at `error` level for security audit before the
/// error is returned.
///
/// # Errors
///
/// Returns `TenantError::CrossTenantAccess` if the organizations differ.
pub fn require_same_org(
    expected: OrganizationId,
    actual: OrganizationId,
    entity: &'static str,
) -> Result<(), TenantError> {
    if expected == actual {
        return Ok(());
    }

    tracing::error!(
        expected = %expected,
        actual = %actual,
        entity,
        "cross-tenant access attempt blocked"
    );

    Err(TenantError::CrossTenantAccess {
        expected,
        actual,
        entity,
    })
}
