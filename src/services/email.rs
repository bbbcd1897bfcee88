//! Email delivery seam.
//!
//! The core only decides *that* a message with a token must go out; delivery
//! belongs to the embedding application. The default implementation logs the
//! message instead of sending it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_confirmation_email(
        &self,
        email: &str,
        user_id: Uuid,
        token: &str,
    ) -> Result<(), AuthError>;

    async fn send_password_reset_email(&self, email: &str, token: &str) -> Result<(), AuthError>;
}

/// Writes the would-be message to the log instead of sending it.
#[derive(Debug, Default, Clone)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send_confirmation_email(
        &self,
        email: &str,
        user_id: Uuid,
        token: &str,
    ) -> Result<(), AuthError> {
        tracing::info!(
            recipient = email,
            user_id = %user_id,
            token,
            "Email confirmation message (logged, not sent)"
        );
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &str, token: &str) -> Result<(), AuthError> {
        tracing::info!(
            recipient = email,
            token,
            "Password reset message (logged, not sent)"
        );
        Ok(())
    }
}
