//! Token issuance and validation.
//!
//! Tokens are HMAC-SHA256 signed bearer credentials carrying the tenant and
//! role claims captured at issuance time. They are not persisted and there is
//! no revocation list: validity is exactly signature + lifetime, checked with
//! zero clock-skew tolerance.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::AuthError;
use crate::models::User;

/// Issues and validates access tokens.
///
/// Key material is derived from the configured secret once, at construction,
/// and reused for the process lifetime.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    token_lifetime_minutes: i64,
}

/// Access token claim set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user id).
    pub sub: String,
    /// User name at issuance time.
    pub unique_name: String,
    /// Tenant the token is valid for.
    pub tenant_id: String,
    /// Roles held at issuance time.
    pub roles: Vec<String>,
    /// Token id.
    pub jti: String,
    pub iss: String,
    pub aud: String,
    /// Not valid before (Unix timestamp).
    pub nbf: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Parsed claims of a successfully validated token.
#[derive(Debug, Clone)]
pub struct ValidatedToken {
    pub user_id: Uuid,
    pub user_name: String,
    pub tenant_id: Uuid,
    pub roles: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, AuthError> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);

        tracing::info!("JWT service initialized with HS256 signing key");

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            token_lifetime_minutes: config.token_lifetime_minutes,
        })
    }

    /// Issue a signed token for a user with the given roles and tenant.
    pub fn issue_token(
        &self,
        user: &User,
        roles: &[String],
        tenant_id: Uuid,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires = now + Duration::minutes(self.token_lifetime_minutes);

        let claims = AccessTokenClaims {
            sub: user.user_id.to_string(),
            unique_name: user.user_name.clone(),
            tenant_id: tenant_id.to_string(),
            roles: roles.to_vec(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            nbf: now.timestamp(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::TokenGenerationFailed)
    }

    /// Validate a token and return its parsed claims.
    ///
    /// Failures classify into exactly three terminal outcomes: expired, bad
    /// signature, or generically malformed (which also covers issuer/audience
    /// mismatches). The holder must log in again in every case.
    pub fn validate_token(&self, token: &str) -> Result<ValidatedToken, AuthError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::warn!("Token validation failed: expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidSignature => {
                    tracing::warn!("Token validation failed: invalid signature");
                    AuthError::TokenSignatureInvalid
                }
                kind => {
                    tracing::warn!(?kind, "Token validation failed");
                    AuthError::TokenMalformed
                }
            })?;

        let claims = data.claims;
        let user_id = claims.sub.parse().map_err(|_| AuthError::TokenMalformed)?;
        let tenant_id = claims
            .tenant_id
            .parse()
            .map_err(|_| AuthError::TokenMalformed)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::TokenMalformed)?;

        Ok(ValidatedToken {
            user_id,
            user_name: claims.unique_name,
            tenant_id,
            roles: claims.roles,
            expires_at,
        })
    }

    /// Token lifetime in seconds, for `expires_in` responses.
    pub fn token_lifetime_seconds(&self) -> i64 {
        self.token_lifetime_minutes * 60
    }
}
