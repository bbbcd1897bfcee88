//! Idempotent role assignment.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::AuthError;
use crate::models::{normalize, Role};
use crate::store::IdentityStore;

/// Ensures a named role exists for a tenant and is attached to a user.
///
/// Repeated identical calls leave exactly one role row and one membership.
/// If role creation fails nothing is attached, so the caller never observes a
/// partial assignment.
#[derive(Clone)]
pub struct RoleAssigner {
    store: Arc<dyn IdentityStore>,
}

impl RoleAssigner {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    pub async fn assign_role(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role_name: &str,
    ) -> Result<(), AuthError> {
        let normalized = normalize(role_name);

        let role = match self.store.find_role_by_name(tenant_id, &normalized).await? {
            Some(role) => role,
            None => {
                let candidate = Role::new(tenant_id, role_name.to_string());
                self.store
                    .create_role(&candidate)
                    .await
                    .map_err(|e| AuthError::RoleCreationFailed(e.to_string()))?;

                // A concurrent caller may have won the insert; the surviving
                // row is whatever the store kept for this normalized name.
                self.store
                    .find_role_by_name(tenant_id, &normalized)
                    .await?
                    .ok_or_else(|| {
                        AuthError::RoleCreationFailed(format!(
                            "role '{}' missing after create",
                            role_name
                        ))
                    })?
            }
        };

        if self.store.user_has_role(user_id, role.role_id).await? {
            return Ok(());
        }

        self.store.add_role_to_user(user_id, role.role_id).await?;
        tracing::info!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            role = role_name,
            "Role assigned to user"
        );
        Ok(())
    }
}
