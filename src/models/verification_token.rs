//! One-shot verification tokens for email confirmation and password reset.
//!
//! Tokens are random 256-bit values handed to the user out of band; only the
//! SHA-256 of the value is stored, so a leaked store cannot redeem them.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    EmailConfirmation,
    PasswordReset,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailConfirmation => "email_confirmation",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct VerificationToken {
    pub token_id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub purpose_code: String,
    pub expires_utc: DateTime<Utc>,
    pub created_utc: DateTime<Utc>,
}

impl VerificationToken {
    /// Email confirmation tokens live for 24 hours.
    pub fn new_email_confirmation(user_id: Uuid, raw_token: &str) -> Self {
        Self::new(user_id, raw_token, TokenPurpose::EmailConfirmation, Duration::hours(24))
    }

    /// Password reset tokens live for 1 hour.
    pub fn new_password_reset(user_id: Uuid, raw_token: &str) -> Self {
        Self::new(user_id, raw_token, TokenPurpose::PasswordReset, Duration::hours(1))
    }

    fn new(user_id: Uuid, raw_token: &str, purpose: TokenPurpose, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_id: Uuid::new_v4(),
            user_id,
            token_hash: Self::hash_token(raw_token),
            purpose_code: purpose.as_str().to_string(),
            expires_utc: now + lifetime,
            created_utc: now,
        }
    }

    pub fn hash_token(raw_token: &str) -> String {
        hex::encode(Sha256::digest(raw_token.as_bytes()))
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_utc
    }
}
