//! Authentication manager

use anyhow::Result;

use super::jwt::{JwtError, SessionClaims, create_session_token, validate_session_token};
use crate::core::config::AuthConfig;
use crate::core::storage::AppStorage;
use crate::data::types::UserRow;

/// Issues and validates session tokens
pub struct AuthManager {
    signing_key: Vec<u8>,
    session_ttl_hours: u32,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("signing_key", &"[REDACTED]")
            .field("session_ttl_hours", &self.session_ttl_hours)
            .finish()
    }
}

impl AuthManager {
    /// Initialize with the persisted signing key from the data directory
    pub async fn init(storage: &AppStorage, config: &AuthConfig) -> Result<Self> {
        let signing_key = storage.load_or_create_session_key().await?;
        tracing::debug!(
            session_ttl_hours = config.session_ttl_hours,
            "Authentication initialized"
        );
        Ok(Self::new(signing_key, config.session_ttl_hours))
    }

    pub fn new(signing_key: Vec<u8>, session_ttl_hours: u32) -> Self {
        Self {
            signing_key,
            session_ttl_hours,
        }
    }

    pub fn session_ttl_hours(&self) -> u32 {
        self.session_ttl_hours
    }

    /// Issue a session token for a user
    pub fn create_session(&self, user: &UserRow) -> Result<(String, SessionClaims)> {
        let claims = SessionClaims::new(user.id, &user.username, user.role, self.session_ttl_hours);
        let token = create_session_token(&self.signing_key, &claims)?;
        Ok((token, claims))
    }

    /// Validate a JWT session token
    pub fn validate_session(&self, jwt: &str) -> Result<SessionClaims, JwtError> {
        validate_session_token(jwt, &self.signing_key)
    }
}
