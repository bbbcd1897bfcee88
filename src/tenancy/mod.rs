//! Tenant resolution.
//!
//! The tenant is established earlier in the request pipeline (header, route
//! segment, or equivalent) by the embedding layer; this module only carries
//! that context into the core. Resolution never fails loudly: an absent
//! context is `None`, and every operation downstream treats it as a hard
//! "Tenant context not found" failure.

use uuid::Uuid;

use crate::error::AuthError;
use crate::models::Tenant;

/// The tenant resolved for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTenant {
    pub tenant_id: Uuid,
    pub name: String,
    pub identifier: String,
}

impl From<Tenant> for CurrentTenant {
    fn from(t: Tenant) -> Self {
        Self {
            tenant_id: t.tenant_id,
            name: t.tenant_name,
            identifier: t.identifier,
        }
    }
}

/// Maps request context to a tenant. Returns `None`, never an error, when no
/// tenant context exists.
pub trait TenantProvider: Send + Sync {
    fn current_tenant(&self) -> Option<CurrentTenant>;

    fn current_tenant_id(&self) -> Option<Uuid> {
        self.current_tenant().map(|t| t.tenant_id)
    }

    /// The current tenant id, or the hard failure every tenant-scoped
    /// operation maps an absent context to.
    fn require_tenant_id(&self) -> Result<Uuid, AuthError> {
        self.current_tenant_id().ok_or(AuthError::TenantNotFound)
    }
}

/// Provider holding a context fixed at construction; the embedding layer
/// builds one per request after resolving the tenant, and tests use it
/// directly.
#[derive(Debug, Clone, Default)]
pub struct StaticTenantProvider {
    tenant: Option<CurrentTenant>,
}

impl StaticTenantProvider {
    pub fn new(tenant: CurrentTenant) -> Self {
        Self {
            tenant: Some(tenant),
        }
    }

    /// A provider with no resolved tenant.
    pub fn empty() -> Self {
        Self { tenant: None }
    }
}

impl TenantProvider for StaticTenantProvider {
    fn current_tenant(&self) -> Option<CurrentTenant> {
        self.tenant.clone()
    }
}
