//! User model - tenant-scoped user accounts.
//!
//! Users are unique per (tenant_id, normalized_user_name) and
//! (tenant_id, normalized_email); every lookup carries the tenant id.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::normalize;

/// User entity (tenant-scoped).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: String,
    pub normalized_email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub created_utc: DateTime<Utc>,
}

impl User {
    /// Create a new unconfirmed user in the given tenant.
    pub fn new(tenant_id: Uuid, user_name: String, email: String, password_hash: String) -> Self {
        let normalized_user_name = normalize(&user_name);
        let normalized_email = normalize(&email);
        Self {
            user_id: Uuid::new_v4(),
            tenant_id,
            user_name,
            normalized_user_name,
            email,
            normalized_email,
            password_hash,
            email_confirmed: false,
            created_utc: Utc::now(),
        }
    }

    /// Convert to a response without sensitive fields.
    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self.clone())
    }
}

/// User response for callers (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub email_confirmed: bool,
    pub created_utc: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            tenant_id: u.tenant_id,
            user_name: u.user_name,
            email: u.email,
            email_confirmed: u.email_confirmed,
            created_utc: u.created_utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_normalizes_name_and_email() {
        let user = User::new(
            Uuid::new_v4(),
            "Alice".to_string(),
            "alice@Example.com".to_string(),
            "hash".to_string(),
        );
        assert_eq!(user.normalized_user_name, "ALICE");
        assert_eq!(user.normalized_email, "ALICE@EXAMPLE.COM");
        assert!(!user.email_confirmed);
    }

    #[test]
    fn sanitized_response_carries_no_hash() {
        let user = User::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
        );
        let json = serde_json::to_string(&user.sanitized()).unwrap();
        assert!(!json.contains("hash"));
    }
}
