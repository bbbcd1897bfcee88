//! Role model - tenant-scoped roles, created lazily on first assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::normalize;

/// Role entity (tenant-scoped). Unique per (tenant_id, normalized_name).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub role_id: Uuid,
    pub tenant_id: Uuid,
    pub role_name: String,
    pub normalized_name: String,
    pub created_utc: DateTime<Utc>,
}

impl Role {
    pub fn new(tenant_id: Uuid, role_name: String) -> Self {
        let normalized_name = normalize(&role_name);
        Self {
            role_id: Uuid::new_v4(),
            tenant_id,
            role_name,
            normalized_name,
            created_utc: Utc::now(),
        }
    }
}
