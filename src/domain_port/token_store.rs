use crate::domain_model::*;

/// Exact-match lookup on all four fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenQuery {
    pub token: String,
    pub token_type: TokenType,
    pub subject: Subject,
    pub blacklisted: bool,
}

impl TokenQuery {
    pub fn matches(&self, record: &TokenRecord) -> bool {
        record.token == self.token
            && record.token_type == self.token_type
            && record.subject == self.subject
            && record.blacklisted == self.blacklisted
    }
}

#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a new record. Uniqueness is whatever the backend enforces.
    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, TokenStoreError>;

    /// Return any record matching the query, `None` if there is none.
    async fn find_one(&self, query: &TokenQuery) -> Result<Option<TokenRecord>, TokenStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("infra error: {0}")]
    Store(String),
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
