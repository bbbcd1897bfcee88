//! Credential validation against tenant-scoped storage.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::AuthError;
use crate::models::{normalize, User};
use crate::store::IdentityStore;
use crate::utils::{verify_password, Password, PasswordHashString};

/// Looks up users within a tenant and verifies passwords.
///
/// Unknown user and wrong password produce the same `false`; only the logs
/// distinguish them. Store failures surface as `Err` - a business mismatch
/// never does.
#[derive(Clone)]
pub struct CredentialValidator {
    store: Arc<dyn IdentityStore>,
}

impl CredentialValidator {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Find a user by username, falling back to email, within the tenant.
    ///
    /// A hit whose tenant id differs from the requested tenant is discarded
    /// as not-found, so a store that is not perfectly tenant-isolated still
    /// cannot leak credentials across tenants.
    pub async fn find_user(
        &self,
        tenant_id: Uuid,
        username_or_email: &str,
    ) -> Result<Option<User>, AuthError> {
        let needle = normalize(username_or_email);

        let user = match self.store.find_user_by_name(tenant_id, &needle).await? {
            Some(user) => Some(user),
            None => self.store.find_user_by_email(tenant_id, &needle).await?,
        };

        Ok(user.filter(|u| u.tenant_id == tenant_id))
    }

    /// Validate a (tenant, username-or-email, password) triple.
    pub async fn validate(
        &self,
        tenant_id: Uuid,
        username_or_email: &str,
        password: &str,
    ) -> Result<bool, AuthError> {
        let Some(user) = self.find_user(tenant_id, username_or_email).await? else {
            tracing::warn!(tenant_id = %tenant_id, "Login failed: user not found in tenant");
            return Ok(false);
        };

        Ok(self.check_password(&user, password))
    }

    /// Verify a password against an already-loaded user.
    pub fn check_password(&self, user: &User, password: &str) -> bool {
        let matched = verify_password(
            &Password::new(password.to_string()),
            &PasswordHashString::new(user.password_hash.clone()),
        );
        if !matched {
            tracing::warn!(
                tenant_id = %user.tenant_id,
                user_id = %user.user_id,
                "Login failed: invalid password"
            );
        }
        matched
    }
}
