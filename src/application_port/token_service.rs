use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token service construction failed: {0}")]
    Construction(String),
    #[error("Token invalid or expired")]
    TokenInvalidOrExpired,
    #[error("Token not found")]
    TokenNotFound,
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("signing error: {0}")]
    Signing(String),
}

impl TokenError {
    /// Errors a caller should report as "unauthenticated".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            TokenError::TokenInvalidOrExpired | TokenError::TokenNotFound
        )
    }

    /// Errors a caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, TokenError::Persistence(_))
    }
}

#[derive(Clone, Deserialize)]
pub struct TokenConfig {
    pub secret: String,
    pub access_expiration_minutes: i64,
    pub refresh_expiration_days: i64,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_expiration_minutes", &self.access_expiration_minutes)
            .field("refresh_expiration_days", &self.refresh_expiration_days)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenGrant {
    pub token: String,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access: TokenGrant,
    pub refresh: TokenGrant,
}

#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    /// Mint a signed token. `secret` overrides the configured one.
    fn generate_token(
        &self,
        subject: &Subject,
        expires: DateTime<Utc>,
        token_type: &TokenType,
        secret: Option<&str>,
    ) -> Result<String, TokenError>;

    async fn save_token(
        &self,
        token: &str,
        subject: &Subject,
        expires: DateTime<Utc>,
        token_type: &TokenType,
        blacklisted: bool,
    ) -> Result<TokenRecord, TokenError>;

    /// Check signature and expiry, then require a live, non-blacklisted record.
    async fn verify_token(
        &self,
        token: &str,
        token_type: &TokenType,
    ) -> Result<TokenRecord, TokenError>;

    /// Issue an access/refresh pair; only the refresh token is persisted.
    async fn generate_auth_tokens(&self, subject: &Subject) -> Result<AuthTokens, TokenError>;
}
