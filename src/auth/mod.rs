pub mod password;

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};

pub use password::{hash_password, verify_password, PasswordError};

/// Claim set carried by an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub admin_id: i64,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// A freshly signed token together with the instant it stops being accepted.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// Bad signature, wrong algorithm, or a token that does not decode at all.
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    Expired,

    #[error("invalid token issuer")]
    InvalidIssuer,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret must not be empty")]
    EmptySecret,

    #[error("JWT lifetime of {0} hours is out of range")]
    TtlOutOfRange(u64),

    #[error("token expiry overflows the clock")]
    ExpiryOverflow,

    #[error("JWT generation error: {0}")]
    Generation(#[from] jsonwebtoken::errors::Error),
}

/// Signs and verifies HS256 admin session tokens.
///
/// Built once at startup from [`SecurityConfig`] and shared read-only between requests;
/// verification is a pure function of the token, the supplied clock reading and the secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, issuer: impl Into<String>, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            ttl,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        let ttl = Some(security.jwt_expiry_hours)
            .filter(|hours| *hours <= MAX_JWT_EXPIRY_HOURS)
            .and_then(|hours| i64::try_from(hours).ok())
            .and_then(Duration::try_hours)
            .ok_or(TokenError::TtlOutOfRange(security.jwt_expiry_hours))?;

        Self::new(&security.jwt_secret, security.jwt_issuer.clone(), ttl)
    }

    pub fn issue(&self, admin_id: i64, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOverflow)?;
        let claims = Claims {
            admin_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            // Report the same second-resolution instant that was signed into the token.
            expires_at: Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .unwrap_or(expires_at),
        })
    }

    /// Signature first, then expiry against `now`, then issuer.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<i64, VerificationError> {
        // Time and issuer are checked below against the caller's clock, so the library only
        // checks the signature and algorithm here.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::new();

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| VerificationError::InvalidToken)?;
        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            return Err(VerificationError::Expired);
        }

        if claims.iss != self.issuer {
            return Err(VerificationError::InvalidIssuer);
        }

        Ok(claims.admin_id)
    }
}
