use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the user a token belongs to.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(pub String);

impl Subject {
    pub fn new(id: impl Into<String>) -> Self {
        Subject(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Subject {
    fn from(s: &str) -> Self {
        Subject(s.to_owned())
    }
}

/// Token discriminator. Open set: any non-empty string is a valid type,
/// the associated constructors only cover the common ones.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenType(pub String);

impl TokenType {
    pub fn new(name: impl Into<String>) -> Self {
        TokenType(name.into())
    }

    pub fn access() -> Self {
        TokenType::new("access")
    }

    pub fn refresh() -> Self {
        TokenType::new("refresh")
    }

    pub fn reset_password() -> Self {
        TokenType::new("resetPassword")
    }

    pub fn verify_email() -> Self {
        TokenType::new("verifyEmail")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TokenType {
    fn from(s: &str) -> Self {
        TokenType(s.to_owned())
    }
}

/// The token types the service mints itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTypes {
    pub access: TokenType,
    pub refresh: TokenType,
}

impl TokenTypes {
    pub fn new(access: TokenType, refresh: TokenType) -> Self {
        Self { access, refresh }
    }
}

impl Default for TokenTypes {
    fn default() -> Self {
        Self::new(TokenType::access(), TokenType::refresh())
    }
}

/// Claims carried inside a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub sub: Subject,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

/// Persisted token row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    pub subject: Subject,
    pub expires: DateTime<Utc>,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(default)]
    pub blacklisted: bool,
}
