//! Authentication orchestration.
//!
//! Every operation resolves the current tenant first; without one it fails
//! with `TenantNotFound`. The login path follows tenant -> credentials ->
//! roles -> token, assigning the configured default role when a user logs in
//! with no roles yet.

use std::sync::Arc;

use rand::Rng;
use uuid::Uuid;
use validator::Validate;

use crate::dtos::{
    ChangePasswordRequest, LoginRequest, LoginResponse, PasswordResetConfirm,
    PasswordResetRequest, RegisterRequest, RegisterResponse, UpdateProfileRequest,
};
use crate::error::AuthError;
use crate::models::{normalize, TokenPurpose, User, UserResponse, VerificationToken};
use crate::services::{CredentialValidator, EmailSender, JwtService, RoleAssigner, ValidatedToken};
use crate::store::IdentityStore;
use crate::tenancy::TenantProvider;
use crate::utils::{hash_password, Password};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    tenants: Arc<dyn TenantProvider>,
    email: Arc<dyn EmailSender>,
    credentials: CredentialValidator,
    roles: RoleAssigner,
    jwt: JwtService,
    default_role: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        tenants: Arc<dyn TenantProvider>,
        email: Arc<dyn EmailSender>,
        jwt: JwtService,
        default_role: String,
    ) -> Self {
        Self {
            credentials: CredentialValidator::new(store.clone()),
            roles: RoleAssigner::new(store.clone()),
            store,
            tenants,
            email,
            jwt,
            default_role,
        }
    }

    /// Authenticate a user and issue an access token.
    ///
    /// Unknown user, wrong password, and cross-tenant hits all come back as
    /// `InvalidCredentials`; the logs inside the validator carry the detail.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AuthError> {
        req.validate()?;
        let tenant_id = self.tenants.require_tenant_id()?;

        let user = self
            .credentials
            .find_user(tenant_id, &req.username_or_email)
            .await?
            .ok_or_else(|| {
                tracing::warn!(tenant_id = %tenant_id, "Login failed: user not found in tenant");
                AuthError::InvalidCredentials
            })?;

        if !user.email_confirmed {
            tracing::warn!(
                tenant_id = %tenant_id,
                user_id = %user.user_id,
                "Login failed: email not confirmed"
            );
            return Err(AuthError::EmailNotConfirmed);
        }

        if !self.credentials.check_password(&user, &req.password) {
            return Err(AuthError::InvalidCredentials);
        }

        let mut roles = self.store.roles_for_user(user.user_id).await?;
        if roles.is_empty() {
            // First login: provision the default role before issuing.
            self.roles
                .assign_role(tenant_id, user.user_id, &self.default_role)
                .await?;
            roles = self.store.roles_for_user(user.user_id).await?;
        }
        if roles.is_empty() {
            tracing::warn!(
                tenant_id = %tenant_id,
                user_id = %user.user_id,
                "Login failed: user has no roles"
            );
            return Err(AuthError::NoRolesAssigned);
        }

        let token = self.jwt.issue_token(&user, &roles, tenant_id)?;

        tracing::info!(
            tenant_id = %tenant_id,
            user_id = %user.user_id,
            "User authenticated"
        );

        Ok(LoginResponse::bearer(
            token,
            self.jwt.token_lifetime_seconds(),
        ))
    }

    /// Issue a token for a principal already authenticated by an external
    /// identity provider.
    ///
    /// No password or confirmation check: the provider has attested control of
    /// the email address. The address must still map to a user of the current
    /// tenant, and a user logging in with no roles gets the default role, as
    /// with local login.
    pub async fn oauth_login(&self, email: &str) -> Result<LoginResponse, AuthError> {
        let tenant_id = self.tenants.require_tenant_id()?;

        let user = self
            .store
            .find_user_by_email(tenant_id, &normalize(email))
            .await?
            .ok_or_else(|| {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    "External login failed: no user for address in tenant"
                );
                AuthError::UserNotFound
            })?;

        let mut roles = self.store.roles_for_user(user.user_id).await?;
        if roles.is_empty() {
            self.roles
                .assign_role(tenant_id, user.user_id, &self.default_role)
                .await?;
            roles = self.store.roles_for_user(user.user_id).await?;
        }
        if roles.is_empty() {
            return Err(AuthError::NoRolesAssigned);
        }

        let token = self.jwt.issue_token(&user, &roles, tenant_id)?;

        tracing::info!(
            tenant_id = %tenant_id,
            user_id = %user.user_id,
            "User authenticated via external provider"
        );

        Ok(LoginResponse::bearer(
            token,
            self.jwt.token_lifetime_seconds(),
        ))
    }

    /// Validate a previously issued access token.
    pub fn validate_token(&self, token: &str) -> Result<ValidatedToken, AuthError> {
        self.jwt.validate_token(token)
    }

    /// Ensure a named role exists in the current tenant and is attached to
    /// the user. Idempotent.
    pub async fn assign_role(&self, user_id: Uuid, role_name: &str) -> Result<(), AuthError> {
        let tenant_id = self.tenants.require_tenant_id()?;

        self.store
            .find_user_by_id(tenant_id, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.roles.assign_role(tenant_id, user_id, role_name).await
    }

    /// Register a new unconfirmed user in the current tenant and hand an
    /// email confirmation token to the sender.
    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, AuthError> {
        req.validate()?;
        let tenant_id = self.tenants.require_tenant_id()?;

        let name_taken = self
            .store
            .find_user_by_name(tenant_id, &normalize(&req.user_name))
            .await?
            .is_some();
        let email_taken = self
            .store
            .find_user_by_email(tenant_id, &normalize(&req.email))
            .await?
            .is_some();
        if name_taken || email_taken {
            return Err(AuthError::DuplicateUser);
        }

        let password_hash = hash_password(&Password::new(req.password))?;
        let user = User::new(
            tenant_id,
            req.user_name,
            req.email,
            password_hash.into_string(),
        );
        self.store.insert_user(&user).await?;

        tracing::info!(tenant_id = %tenant_id, user_id = %user.user_id, "User registered");

        self.send_confirmation(&user).await?;

        Ok(RegisterResponse {
            user_id: user.user_id,
            message: "Registration successful. Confirm your email to sign in.".to_string(),
        })
    }

    /// Confirm a user's email with a token from the confirmation message.
    pub async fn confirm_email(&self, user_id: Uuid, token: &str) -> Result<(), AuthError> {
        let tenant_id = self.tenants.require_tenant_id()?;

        let verification = self
            .store
            .find_verification_token(
                &VerificationToken::hash_token(token),
                TokenPurpose::EmailConfirmation,
            )
            .await?
            .filter(|t| t.user_id == user_id)
            .ok_or(AuthError::VerificationTokenInvalid)?;

        if verification.is_expired() {
            self.store
                .delete_verification_token(verification.token_id)
                .await?;
            return Err(AuthError::VerificationTokenExpired);
        }

        let user = self
            .store
            .find_user_by_id(tenant_id, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.store.set_email_confirmed(user.user_id).await?;
        self.store
            .delete_verification_token(verification.token_id)
            .await?;

        tracing::info!(tenant_id = %tenant_id, user_id = %user.user_id, "Email confirmed");
        Ok(())
    }

    /// Re-issue a confirmation token. Succeeds silently when the address is
    /// unknown or already confirmed, so the endpoint cannot be used to
    /// enumerate accounts.
    pub async fn resend_confirmation(&self, email: &str) -> Result<(), AuthError> {
        let tenant_id = self.tenants.require_tenant_id()?;

        let user = self
            .store
            .find_user_by_email(tenant_id, &normalize(email))
            .await?;

        let Some(user) = user.filter(|u| !u.email_confirmed) else {
            tracing::debug!(tenant_id = %tenant_id, "Confirmation resend for unknown or confirmed address");
            return Ok(());
        };

        self.send_confirmation(&user).await
    }

    /// Start a password reset. Always succeeds from the caller's view; only a
    /// known address results in a token being minted and sent.
    pub async fn request_password_reset(
        &self,
        req: PasswordResetRequest,
    ) -> Result<(), AuthError> {
        req.validate()?;
        let tenant_id = self.tenants.require_tenant_id()?;

        let user = self
            .store
            .find_user_by_email(tenant_id, &normalize(&req.email))
            .await?;

        if let Some(user) = user {
            self.store
                .delete_verification_tokens_for_user(user.user_id, TokenPurpose::PasswordReset)
                .await?;
            let raw_token = generate_random_token();
            let verification = VerificationToken::new_password_reset(user.user_id, &raw_token);
            self.store.insert_verification_token(&verification).await?;
            self.email
                .send_password_reset_email(&user.email, &raw_token)
                .await?;
            tracing::info!(tenant_id = %tenant_id, user_id = %user.user_id, "Password reset requested");
        } else {
            tracing::debug!(tenant_id = %tenant_id, "Password reset for unknown address");
        }

        Ok(())
    }

    /// Complete a password reset with the token from the reset message. The
    /// token is consumed whether or not it had expired.
    pub async fn reset_password(&self, req: PasswordResetConfirm) -> Result<(), AuthError> {
        req.validate()?;
        let tenant_id = self.tenants.require_tenant_id()?;

        let user = self
            .store
            .find_user_by_email(tenant_id, &normalize(&req.email))
            .await?
            .ok_or(AuthError::VerificationTokenInvalid)?;

        let verification = self
            .store
            .find_verification_token(
                &VerificationToken::hash_token(&req.token),
                TokenPurpose::PasswordReset,
            )
            .await?
            .filter(|t| t.user_id == user.user_id)
            .ok_or(AuthError::VerificationTokenInvalid)?;

        if verification.is_expired() {
            self.store
                .delete_verification_token(verification.token_id)
                .await?;
            return Err(AuthError::VerificationTokenExpired);
        }

        let password_hash = hash_password(&Password::new(req.new_password))?;
        self.store
            .set_password_hash(user.user_id, password_hash.as_str())
            .await?;
        self.store
            .delete_verification_token(verification.token_id)
            .await?;

        tracing::info!(tenant_id = %tenant_id, user_id = %user.user_id, "Password reset completed");
        Ok(())
    }

    /// Read a user's profile in the current tenant, without credential
    /// material.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserResponse, AuthError> {
        let tenant_id = self.tenants.require_tenant_id()?;

        let user = self
            .store
            .find_user_by_id(tenant_id, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.sanitized())
    }

    /// Update a user's name and email address.
    ///
    /// Changing the email un-confirms the account and starts a fresh
    /// confirmation round; until the new address confirms, local login is
    /// blocked as for a fresh registration.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<UserResponse, AuthError> {
        req.validate()?;
        let tenant_id = self.tenants.require_tenant_id()?;

        let mut user = self
            .store
            .find_user_by_id(tenant_id, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let new_name = normalize(&req.user_name);
        let new_email = normalize(&req.email);

        if new_name != user.normalized_user_name
            && self
                .store
                .find_user_by_name(tenant_id, &new_name)
                .await?
                .is_some()
        {
            return Err(AuthError::DuplicateUser);
        }

        let email_changed = new_email != user.normalized_email;
        if email_changed
            && self
                .store
                .find_user_by_email(tenant_id, &new_email)
                .await?
                .is_some()
        {
            return Err(AuthError::DuplicateUser);
        }

        user.user_name = req.user_name;
        user.normalized_user_name = new_name;
        user.email = req.email;
        user.normalized_email = new_email;
        if email_changed {
            user.email_confirmed = false;
        }
        self.store.update_user(&user).await?;

        if email_changed {
            self.send_confirmation(&user).await?;
        }

        tracing::info!(tenant_id = %tenant_id, user_id = %user.user_id, "Profile updated");
        Ok(user.sanitized())
    }

    /// Change a signed-in user's password after verifying the current one.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        req.validate()?;
        let tenant_id = self.tenants.require_tenant_id()?;

        let user = self
            .store
            .find_user_by_id(tenant_id, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.credentials.check_password(&user, &req.current_password) {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = hash_password(&Password::new(req.new_password))?;
        self.store
            .set_password_hash(user.user_id, password_hash.as_str())
            .await?;

        tracing::info!(tenant_id = %tenant_id, user_id = %user.user_id, "Password changed");
        Ok(())
    }

    /// Validate a (username-or-email, password) pair in the current tenant
    /// without issuing a token.
    pub async fn validate_credentials(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<bool, AuthError> {
        let tenant_id = self.tenants.require_tenant_id()?;
        self.credentials
            .validate(tenant_id, username_or_email, password)
            .await
    }

    /// Mint and send a confirmation token, retiring any earlier one so only
    /// the latest token for the user can confirm.
    async fn send_confirmation(&self, user: &User) -> Result<(), AuthError> {
        self.store
            .delete_verification_tokens_for_user(user.user_id, TokenPurpose::EmailConfirmation)
            .await?;
        let raw_token = generate_random_token();
        let verification = VerificationToken::new_email_confirmation(user.user_id, &raw_token);
        self.store.insert_verification_token(&verification).await?;
        self.email
            .send_confirmation_email(&user.email, user.user_id, &raw_token)
            .await
    }
}

fn generate_random_token() -> String {
    let mut rng = rand::thread_rng();
    let token_bytes: [u8; 32] = rng.gen();
    hex::encode(token_bytes)
}
