//! Tenant model - root of the multi-tenancy hierarchy.
//!
//! Tenants are owned by an external tenant store; this crate only reads them
//! to resolve request context. Immutable once created.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tenant entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub tenant_id: Uuid,
    pub tenant_name: String,
    /// Short external handle used in routes/headers (e.g. "acme").
    pub identifier: String,
}

impl Tenant {
    pub fn new(tenant_name: String, identifier: String) -> Self {
        Self {
            tenant_id: Uuid::new_v4(),
            tenant_name,
            identifier,
        }
    }
}
