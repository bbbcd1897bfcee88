//! Tenant-scoped authentication core.
//!
//! Everything here runs inside a resolved tenant context: users and roles are
//! partitioned by tenant id, credentials are validated against tenant-scoped
//! storage, and issued tokens carry the tenant and role claims captured at
//! issuance time. The HTTP layer that feeds requests in (and the identity
//! store engine behind [`store::IdentityStore`]) live outside this crate.

pub mod config;
pub mod dtos;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;
pub mod store;
pub mod tenancy;
pub mod utils;

pub use config::AuthConfig;
pub use error::AuthError;
pub use services::{AuthService, CredentialValidator, JwtService, RoleAssigner, ValidatedToken};
pub use tenancy::{CurrentTenant, StaticTenantProvider, TenantProvider};
