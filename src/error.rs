use thiserror::Error;

/// Error taxonomy for the authentication core.
///
/// Every expected business failure is a value of this enum and propagates via
/// `Result`; only startup misconfiguration (`Config`) is meant to abort
/// process initialization instead of being handled per request.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Tenant context not found")]
    TenantNotFound,

    /// Covers unknown user, wrong password, and cross-tenant hits alike.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User email is not confirmed")]
    EmailNotConfirmed,

    #[error("User has no assigned roles")]
    NoRolesAssigned,

    #[error("Role creation failed: {0}")]
    RoleCreationFailed(String),

    #[error("Token generation failed")]
    TokenGenerationFailed(#[source] jsonwebtoken::errors::Error),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token signature is invalid")]
    TokenSignatureInvalid,

    #[error("Token is invalid")]
    TokenMalformed,

    #[error("User not found")]
    UserNotFound,

    #[error("A user with that name or email already exists")]
    DuplicateUser,

    #[error("Verification token is invalid")]
    VerificationTokenInvalid,

    #[error("Verification token has expired")]
    VerificationTokenExpired,

    #[error("Password hashing failed: {0}")]
    PasswordHashFailed(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Message safe to show to an end user.
    ///
    /// Unknown user, wrong password, and tenant-mismatch hits all collapse to
    /// the same string so callers cannot enumerate accounts or tenants. Logs
    /// keep the distinction; responses must not.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid username or password",
            AuthError::TenantNotFound => "Invalid username or password",
            AuthError::EmailNotConfirmed => {
                "Email is not confirmed. Check your inbox for the confirmation link."
            }
            AuthError::NoRolesAssigned => "Account is not fully provisioned",
            AuthError::TokenExpired => "Session has expired, please sign in again",
            AuthError::TokenSignatureInvalid | AuthError::TokenMalformed => {
                "Session is invalid, please sign in again"
            }
            AuthError::DuplicateUser => "A user with that name or email already exists",
            AuthError::VerificationTokenInvalid | AuthError::VerificationTokenExpired => {
                "The link is invalid or has expired"
            }
            AuthError::Validation(_) => "Request validation failed",
            _ => "An unexpected error occurred",
        }
    }

    /// Token validation failures are terminal: the holder must log in again.
    pub fn requires_fresh_login(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired | AuthError::TokenSignatureInvalid | AuthError::TokenMalformed
        )
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Store(anyhow::Error::new(err))
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::Validation(err.to_string())
    }
}
