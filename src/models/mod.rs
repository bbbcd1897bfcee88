pub mod role;
pub mod tenant;
pub mod user;
pub mod verification_token;

pub use role::Role;
pub use tenant::Tenant;
pub use user::{User, UserResponse};
pub use verification_token::{TokenPurpose, VerificationToken};

/// Canonical form used for case-insensitive uniqueness checks on user names,
/// emails, and role names.
pub fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize("  alice@Example.com "), "ALICE@EXAMPLE.COM");
        assert_eq!(normalize("Admin"), "ADMIN");
    }
}
