use crate::domain_model::*;
use crate::domain_port::*;
use anyhow::anyhow;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// One JSON-encoded record per (type, token). Records carry no TTL, so
/// expired ones stay until something outside the store deletes them.
pub struct RedisTokenStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisTokenStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, token_type: &TokenType, token: &str) -> String {
        record_key(&self.prefix, token_type, token)
    }
}

fn record_key(prefix: &str, token_type: &TokenType, token: &str) -> String {
    format!("{}:{}:{}", prefix, token_type, token)
}

/// Plain `SET key value`, a single command so a failed write leaves nothing behind.
fn set_record_cmd(key: &str, record: &TokenRecord) -> Result<redis::Cmd, TokenStoreError> {
    let value = serde_json::to_string(record).map_err(|e| anyhow!(e))?;
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value);
    Ok(cmd)
}

fn decode_record(raw: &str, query: &TokenQuery) -> Result<Option<TokenRecord>, TokenStoreError> {
    let record: TokenRecord = serde_json::from_str(raw).map_err(|e| anyhow!(e))?;
    Ok(query.matches(&record).then_some(record))
}

#[async_trait::async_trait]
impl TokenStore for RedisTokenStore {
    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, TokenStoreError> {
        let key = self.key(&record.token_type, &record.token);
        let cmd = set_record_cmd(&key, &record)?;
        let mut conn = self.conn.clone();

        let _: () = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;

        Ok(record)
    }

    async fn find_one(&self, query: &TokenQuery) -> Result<Option<TokenRecord>, TokenStoreError> {
        let key = self.key(&query.token_type, &query.token);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;

        match raw {
            Some(raw) => decode_record(&raw, query),
            None => Ok(None),
        }
    }
}
