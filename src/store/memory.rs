//! In-memory implementation of [`IdentityStore`].
//!
//! Backs the test suites; behaves like the Postgres store including the
//! quiet-conflict semantics of `create_role` and `add_role_to_user`.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;
use crate::models::{Role, Tenant, TokenPurpose, User, VerificationToken};
use crate::store::IdentityStore;

#[derive(Default)]
struct Inner {
    tenants: Vec<Tenant>,
    users: HashMap<Uuid, User>,
    roles: Vec<Role>,
    user_roles: HashSet<(Uuid, Uuid)>,
    tokens: HashMap<Uuid, VerificationToken>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tenant. Tenants are owned externally in production, so this is
    /// not part of the trait.
    pub fn add_tenant(&self, tenant: Tenant) {
        self.inner.write().unwrap().tenants.push(tenant);
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_tenant_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AuthError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .tenants
            .iter()
            .find(|t| t.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_tenant_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Tenant>, AuthError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .tenants
            .iter()
            .find(|t| t.identifier == identifier)
            .cloned())
    }

    async fn find_user_by_id(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<User>, AuthError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .users
            .get(&user_id)
            .filter(|u| u.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_user_by_name(
        &self,
        tenant_id: Uuid,
        normalized_user_name: &str,
    ) -> Result<Option<User>, AuthError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .users
            .values()
            .find(|u| {
                u.tenant_id == tenant_id && u.normalized_user_name == normalized_user_name
            })
            .cloned())
    }

    async fn find_user_by_email(
        &self,
        tenant_id: Uuid,
        normalized_email: &str,
    ) -> Result<Option<User>, AuthError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .users
            .values()
            .find(|u| u.tenant_id == tenant_id && u.normalized_email == normalized_email)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AuthError> {
        let mut inner = self.inner.write().unwrap();
        let duplicate = inner.users.values().any(|u| {
            u.tenant_id == user.tenant_id
                && (u.normalized_user_name == user.normalized_user_name
                    || u.normalized_email == user.normalized_email)
        });
        if duplicate {
            return Err(AuthError::Store(anyhow::anyhow!(
                "unique constraint violation on users"
            )));
        }
        inner.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), AuthError> {
        let mut inner = self.inner.write().unwrap();
        if let Some(existing) = inner.users.get_mut(&user.user_id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn set_email_confirmed(&self, user_id: Uuid) -> Result<(), AuthError> {
        let mut inner = self.inner.write().unwrap();
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.email_confirmed = true;
        }
        Ok(())
    }

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        let mut inner = self.inner.write().unwrap();
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn find_role_by_name(
        &self,
        tenant_id: Uuid,
        normalized_name: &str,
    ) -> Result<Option<Role>, AuthError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .roles
            .iter()
            .find(|r| r.tenant_id == tenant_id && r.normalized_name == normalized_name)
            .cloned())
    }

    async fn create_role(&self, role: &Role) -> Result<(), AuthError> {
        let mut inner = self.inner.write().unwrap();
        let exists = inner
            .roles
            .iter()
            .any(|r| r.tenant_id == role.tenant_id && r.normalized_name == role.normalized_name);
        if !exists {
            inner.roles.push(role.clone());
        }
        Ok(())
    }

    async fn add_role_to_user(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AuthError> {
        let mut inner = self.inner.write().unwrap();
        inner.user_roles.insert((user_id, role_id));
        Ok(())
    }

    async fn user_has_role(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, AuthError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.user_roles.contains(&(user_id, role_id)))
    }

    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<String>, AuthError> {
        let inner = self.inner.read().unwrap();
        let mut names: Vec<String> = inner
            .roles
            .iter()
            .filter(|r| inner.user_roles.contains(&(user_id, r.role_id)))
            .map(|r| r.role_name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn insert_verification_token(
        &self,
        token: &VerificationToken,
    ) -> Result<(), AuthError> {
        let mut inner = self.inner.write().unwrap();
        inner.tokens.insert(token.token_id, token.clone());
        Ok(())
    }

    async fn find_verification_token(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<VerificationToken>, AuthError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .tokens
            .values()
            .find(|t| t.token_hash == token_hash && t.purpose_code == purpose.as_str())
            .cloned())
    }

    async fn delete_verification_token(&self, token_id: Uuid) -> Result<(), AuthError> {
        let mut inner = self.inner.write().unwrap();
        inner.tokens.remove(&token_id);
        Ok(())
    }

    async fn delete_verification_tokens_for_user(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<(), AuthError> {
        let mut inner = self.inner.write().unwrap();
        inner
            .tokens
            .retain(|_, t| !(t.user_id == user_id && t.purpose_code == purpose.as_str()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn user_lookups_are_tenant_scoped() {
        let store = MemoryStore::new();
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();
        let user = User::new(
            tenant_a,
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
        );
        store.insert_user(&user).await.unwrap();

        assert!(store
            .find_user_by_name(tenant_a, "ALICE")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_user_by_name(tenant_b, "ALICE")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_user_by_id(tenant_b, user.user_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_role_insert_keeps_first_row() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let first = Role::new(tenant, "Admin".to_string());
        let second = Role::new(tenant, "admin".to_string());
        store.create_role(&first).await.unwrap();
        store.create_role(&second).await.unwrap();

        let survivor = store
            .find_role_by_name(tenant, "ADMIN")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(survivor.role_id, first.role_id);
    }

    #[tokio::test]
    async fn purging_user_tokens_is_scoped_to_purpose() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let confirm = VerificationToken::new_email_confirmation(user_id, "confirm-raw");
        let reset = VerificationToken::new_password_reset(user_id, "reset-raw");
        store.insert_verification_token(&confirm).await.unwrap();
        store.insert_verification_token(&reset).await.unwrap();

        store
            .delete_verification_tokens_for_user(user_id, TokenPurpose::PasswordReset)
            .await
            .unwrap();

        assert!(store
            .find_verification_token(&reset.token_hash, TokenPurpose::PasswordReset)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_verification_token(&confirm.token_hash, TokenPurpose::EmailConfirmation)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn duplicate_user_insert_is_rejected() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let user = User::new(
            tenant,
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
        );
        store.insert_user(&user).await.unwrap();

        let dupe = User::new(
            tenant,
            "ALICE".to_string(),
            "other@example.com".to_string(),
            "hash".to_string(),
        );
        assert!(store.insert_user(&dupe).await.is_err());
    }
}
