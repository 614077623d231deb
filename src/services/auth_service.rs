use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{self, PasswordError, TokenError, TokenIssuer};
use crate::database::models::{AdminLookup, AdminPublic, NewAdmin};
use crate::database::{DatabaseError, Store};

/// Well-formed Argon2id hash of no real password. Unknown identifiers are checked against it
/// so a miss costs the same hashing work as a wrong password.
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown identifier or wrong password; deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("admin already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Persistence(#[from] DatabaseError),
}

#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub identifier: AdminLookup,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub admin: AdminPublic,
}

pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenIssuer>) -> Self {
        Self { store, tokens }
    }

    pub async fn login(
        &self,
        credentials: LoginCredentials,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AuthError> {
        let admin = self.store.find_admin(&credentials.identifier).await?;

        let admin = match admin {
            Some(admin) if auth::verify_password(&credentials.password, &admin.password_hash) => {
                admin
            }
            Some(admin) => {
                warn!("Login rejected for admin {}: wrong password", admin.id);
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                let _ = auth::verify_password(&credentials.password, DECOY_HASH);
                warn!("Login rejected: unknown identifier");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let issued = self.tokens.issue(admin.id, now)?;
        info!("Admin {} logged in; session expires at {}", admin.id, issued.expires_at);

        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            admin: AdminPublic::from(&admin),
        })
    }
}

/// Create an admin account. This is the only way admins come into existence.
pub async fn provision_admin(
    store: &dyn Store,
    username: &str,
    email: &str,
    password: &str,
) -> Result<AdminPublic, AuthError> {
    let password_hash = auth::hash_password(password)?;

    let admin = store
        .create_admin(NewAdmin {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await
        .map_err(|err| match err {
            DatabaseError::UniqueViolation(constraint) => AuthError::AlreadyExists(constraint),
            other => AuthError::Persistence(other),
        })?;

    info!("Provisioned admin {} ({})", admin.username, admin.id);
    Ok(AdminPublic::from(&admin))
}
