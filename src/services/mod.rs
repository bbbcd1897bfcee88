//! Business logic services: credential validation, role assignment, token
//! issuance, and the login/registration orchestration over them.

mod auth;
mod credentials;
mod email;
mod jwt;
mod roles;

pub use auth::AuthService;
pub use credentials::CredentialValidator;
pub use email::{EmailSender, LoggingEmailSender};
pub use jwt::{AccessTokenClaims, JwtService, ValidatedToken};
pub use roles::RoleAssigner;
