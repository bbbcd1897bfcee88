//! Identity/tenant store capability.
//!
//! The storage engine itself is an external collaborator; this trait captures
//! exactly what the authentication core needs from it: tenant-scoped user and
//! role lookups, idempotent role plumbing, and verification-token bookkeeping.
//! All user and role reads carry a tenant id - there is no un-scoped path to
//! another tenant's rows.
//!
//! Calls are plain async fns: dropping the returned future cancels the call,
//! and the core never retries a failed store operation internally.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;
use crate::models::{Role, Tenant, TokenPurpose, User, VerificationToken};

#[async_trait]
pub trait IdentityStore: Send + Sync {
    // Tenants (read-only: their lifecycle is owned elsewhere).
    async fn find_tenant_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AuthError>;
    async fn find_tenant_by_identifier(&self, identifier: &str)
        -> Result<Option<Tenant>, AuthError>;

    // Users. Name/email lookups take the normalized form.
    async fn find_user_by_id(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<User>, AuthError>;
    async fn find_user_by_name(
        &self,
        tenant_id: Uuid,
        normalized_user_name: &str,
    ) -> Result<Option<User>, AuthError>;
    async fn find_user_by_email(
        &self,
        tenant_id: Uuid,
        normalized_email: &str,
    ) -> Result<Option<User>, AuthError>;
    async fn insert_user(&self, user: &User) -> Result<(), AuthError>;
    async fn update_user(&self, user: &User) -> Result<(), AuthError>;
    async fn set_email_confirmed(&self, user_id: Uuid) -> Result<(), AuthError>;
    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str)
        -> Result<(), AuthError>;

    // Roles. `create_role` must tolerate a concurrent insert of the same
    // (tenant_id, normalized_name) without duplicating the row.
    async fn find_role_by_name(
        &self,
        tenant_id: Uuid,
        normalized_name: &str,
    ) -> Result<Option<Role>, AuthError>;
    async fn create_role(&self, role: &Role) -> Result<(), AuthError>;
    async fn add_role_to_user(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AuthError>;
    async fn user_has_role(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, AuthError>;
    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<String>, AuthError>;

    // Verification tokens (email confirmation / password reset). Minting a
    // replacement deletes the user's prior tokens for that purpose, so the
    // table never accumulates superseded or expired rows per user.
    async fn insert_verification_token(
        &self,
        token: &VerificationToken,
    ) -> Result<(), AuthError>;
    async fn find_verification_token(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<VerificationToken>, AuthError>;
    async fn delete_verification_token(&self, token_id: Uuid) -> Result<(), AuthError>;
    async fn delete_verification_tokens_for_user(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<(), AuthError>;
}
