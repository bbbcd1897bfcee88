//! PostgreSQL implementation of [`IdentityStore`] built on sqlx.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::AuthError;
use crate::models::{Role, Tenant, TokenPurpose, User, VerificationToken};
use crate::store::IdentityStore;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AuthError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        tracing::info!("Connected to identity store");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ping the database.
    pub async fn health_check(&self) -> Result<(), AuthError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for PostgresStore {
    async fn find_tenant_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AuthError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    async fn find_tenant_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Tenant>, AuthError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE identifier = $1")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    async fn find_user_by_id(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_name(
        &self,
        tenant_id: Uuid,
        normalized_user_name: &str,
    ) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE tenant_id = $1 AND normalized_user_name = $2",
        )
        .bind(tenant_id)
        .bind(normalized_user_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(
        &self,
        tenant_id: Uuid,
        normalized_email: &str,
    ) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE tenant_id = $1 AND normalized_email = $2",
        )
        .bind(tenant_id)
        .bind(normalized_email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id, tenant_id, user_name, normalized_user_name,
                email, normalized_email, password_hash, email_confirmed, created_utc
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.user_id)
        .bind(user.tenant_id)
        .bind(&user.user_name)
        .bind(&user.normalized_user_name)
        .bind(&user.email)
        .bind(&user.normalized_email)
        .bind(&user.password_hash)
        .bind(user.email_confirmed)
        .bind(user.created_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            UPDATE users
            SET user_name = $2, normalized_user_name = $3,
                email = $4, normalized_email = $5, email_confirmed = $6
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id)
        .bind(&user.user_name)
        .bind(&user.normalized_user_name)
        .bind(&user.email)
        .bind(&user.normalized_email)
        .bind(user.email_confirmed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_email_confirmed(&self, user_id: Uuid) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET email_confirmed = TRUE WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_role_by_name(
        &self,
        tenant_id: Uuid,
        normalized_name: &str,
    ) -> Result<Option<Role>, AuthError> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE tenant_id = $1 AND normalized_name = $2",
        )
        .bind(tenant_id)
        .bind(normalized_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn create_role(&self, role: &Role) -> Result<(), AuthError> {
        // A concurrent insert of the same (tenant_id, normalized_name) wins
        // quietly; callers re-read the surviving row.
        sqlx::query(
            r#"
            INSERT INTO roles (role_id, tenant_id, role_name, normalized_name, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (tenant_id, normalized_name) DO NOTHING
            "#,
        )
        .bind(role.role_id)
        .bind(role.tenant_id)
        .bind(&role.role_name)
        .bind(&role.normalized_name)
        .bind(role.created_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_role_to_user(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn user_has_role(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, AuthError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_roles WHERE user_id = $1 AND role_id = $2",
        )
        .bind(user_id)
        .bind(role_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<String>, AuthError> {
        let roles: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.role_name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.role_id
            WHERE ur.user_id = $1
            ORDER BY r.role_name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn insert_verification_token(
        &self,
        token: &VerificationToken,
    ) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO verification_tokens (
                token_id, user_id, token_hash, purpose_code, expires_utc, created_utc
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.token_id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(&token.purpose_code)
        .bind(token.expires_utc)
        .bind(token.created_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_verification_token(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<VerificationToken>, AuthError> {
        let token = sqlx::query_as::<_, VerificationToken>(
            "SELECT * FROM verification_tokens WHERE token_hash = $1 AND purpose_code = $2",
        )
        .bind(token_hash)
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    async fn delete_verification_token(&self, token_id: Uuid) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM verification_tokens WHERE token_id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_verification_tokens_for_user(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "DELETE FROM verification_tokens WHERE user_id = $1 AND purpose_code = $2",
        )
        .bind(user_id)
        .bind(purpose.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
