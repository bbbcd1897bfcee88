//! Shared harness for integration tests.
//!
//! Builds an `AuthService` over the in-memory store with a seeded tenant and
//! a capturing email sender, so confirmation/reset tokens minted by the core
//! can be read back by tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use tenant_auth::config::JwtConfig;
use tenant_auth::dtos::RegisterRequest;
use tenant_auth::models::Tenant;
use tenant_auth::services::{AuthService, EmailSender, JwtService};
use tenant_auth::store::{IdentityStore, MemoryStore};
use tenant_auth::{AuthError, CurrentTenant, StaticTenantProvider};

pub const TEST_SECRET: &str = "integration-test-signing-secret-0123456789";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        issuer: "tenant-auth".to_string(),
        audience: "tenant-auth-clients".to_string(),
        token_lifetime_minutes: 120,
    }
}

/// Email sender that records every message instead of delivering it.
#[derive(Default)]
pub struct CapturingEmailSender {
    pub confirmations: Mutex<Vec<(Uuid, String)>>,
    pub resets: Mutex<Vec<(String, String)>>,
}

impl CapturingEmailSender {
    pub fn last_confirmation_token(&self) -> Option<(Uuid, String)> {
        self.confirmations.lock().unwrap().last().cloned()
    }

    pub fn last_reset_token(&self) -> Option<String> {
        self.resets.lock().unwrap().last().map(|(_, t)| t.clone())
    }

    pub fn reset_count(&self) -> usize {
        self.resets.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailSender for CapturingEmailSender {
    async fn send_confirmation_email(
        &self,
        _email: &str,
        user_id: Uuid,
        token: &str,
    ) -> Result<(), AuthError> {
        self.confirmations
            .lock()
            .unwrap()
            .push((user_id, token.to_string()));
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &str, token: &str) -> Result<(), AuthError> {
        self.resets
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub mail: Arc<CapturingEmailSender>,
    pub tenant: CurrentTenant,
    pub auth: AuthService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::for_tenant("acme")
    }

    pub fn for_tenant(identifier: &str) -> Self {
        let store = Arc::new(MemoryStore::new());
        let mail = Arc::new(CapturingEmailSender::default());

        let tenant = Tenant::new(identifier.to_uppercase(), identifier.to_string());
        store.add_tenant(tenant.clone());
        let tenant = CurrentTenant::from(tenant);

        let auth = AuthService::new(
            store.clone() as Arc<dyn IdentityStore>,
            Arc::new(StaticTenantProvider::new(tenant.clone())),
            mail.clone(),
            JwtService::new(&jwt_config()).unwrap(),
            "User".to_string(),
        );

        Self {
            store,
            mail,
            tenant,
            auth,
        }
    }

    /// Seed another tenant into the same store and return a service whose
    /// request context resolves to it.
    pub fn service_for_new_tenant(&self, identifier: &str) -> AuthService {
        let tenant = Tenant::new(identifier.to_uppercase(), identifier.to_string());
        self.store.add_tenant(tenant.clone());
        self.service_with_provider(StaticTenantProvider::new(CurrentTenant::from(tenant)))
    }

    /// A service over the same store with no resolved tenant context.
    pub fn service_without_tenant(&self) -> AuthService {
        self.service_with_provider(StaticTenantProvider::empty())
    }

    fn service_with_provider(&self, provider: StaticTenantProvider) -> AuthService {
        AuthService::new(
            self.store.clone() as Arc<dyn IdentityStore>,
            Arc::new(provider),
            self.mail.clone(),
            JwtService::new(&jwt_config()).unwrap(),
            "User".to_string(),
        )
    }

    /// Register a user and confirm their email via the captured token.
    pub async fn register_confirmed_user(
        &self,
        user_name: &str,
        email: &str,
        password: &str,
    ) -> Uuid {
        let response = self
            .auth
            .register(RegisterRequest {
                user_name: user_name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
            .expect("registration failed");

        let (user_id, token) = self
            .mail
            .last_confirmation_token()
            .expect("no confirmation token captured");
        assert_eq!(user_id, response.user_id);

        self.auth
            .confirm_email(user_id, &token)
            .await
            .expect("email confirmation failed");

        user_id
    }
}
