use std::env;

use crate::error::AuthError;

/// Minimum length for the JWT signing secret, in bytes.
/// HS256 keys shorter than the hash output weaken the MAC.
const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    /// Role attached on first login when a user holds no roles yet.
    pub default_role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_lifetime_minutes: i64,
}

impl AuthConfig {
    /// Load configuration from the environment, failing fast on anything
    /// invalid. A broken signing secret must abort startup, not surface later
    /// per request.
    pub fn from_env() -> Result<Self, AuthError> {
        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str.parse().map_err(AuthError::Config)?;

        let is_prod = environment == Environment::Prod;

        let config = AuthConfig {
            environment,
            service_name: get_env("SERVICE_NAME", Some("tenant-auth"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: get_env("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| AuthError::Config(e.to_string()))?,
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET", None, is_prod)?,
                issuer: get_env("JWT_ISSUER", None, is_prod)?,
                audience: get_env("JWT_AUDIENCE", None, is_prod)?,
                token_lifetime_minutes: get_env("TOKEN_LIFETIME_MINUTES", Some("120"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| AuthError::Config(e.to_string()))?,
            },
            default_role: get_env("DEFAULT_ROLE", Some("User"), is_prod)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        self.jwt.validate()?;

        if self.database.max_connections == 0 {
            return Err(AuthError::Config(
                "DATABASE_MAX_CONNECTIONS must be greater than 0".to_string(),
            ));
        }

        if self.default_role.trim().is_empty() {
            return Err(AuthError::Config(
                "DEFAULT_ROLE must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::Config(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        if self.issuer.is_empty() || self.audience.is_empty() {
            return Err(AuthError::Config(
                "JWT_ISSUER and JWT_AUDIENCE must be set".to_string(),
            ));
        }

        if self.token_lifetime_minutes <= 0 {
            return Err(AuthError::Config(
                "TOKEN_LIFETIME_MINUTES must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AuthError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AuthError::Config(format!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AuthError::Config(format!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "an-adequately-long-signing-secret-0123456789".to_string(),
            issuer: "tenant-auth".to_string(),
            audience: "tenant-auth-clients".to_string(),
            token_lifetime_minutes: 120,
        }
    }

    #[test]
    fn short_secret_is_rejected() {
        let config = JwtConfig {
            secret: "too-short".to_string(),
            ..valid_jwt_config()
        };
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));
    }

    #[test]
    fn non_positive_lifetime_is_rejected() {
        let config = JwtConfig {
            token_lifetime_minutes: 0,
            ..valid_jwt_config()
        };
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_jwt_config().validate().is_ok());
    }
}
