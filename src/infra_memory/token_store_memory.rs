use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-local token store. Records are grouped by token string and are
/// never purged on expiry.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: DashMap<String, Vec<TokenRecord>>,
    create_calls: AtomicUsize,
    find_calls: AtomicUsize,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every record for `token` as blacklisted. Returns how many changed.
    pub fn blacklist(&self, token: &str) -> usize {
        let Some(mut entry) = self.records.get_mut(token) else {
            return 0;
        };
        let mut changed = 0;
        for record in entry.iter_mut().filter(|r| !r.blacklisted) {
            record.blacklisted = true;
            changed += 1;
        }
        changed
    }

    /// Delete every record for `token`. Returns how many were removed.
    pub fn remove(&self, token: &str) -> usize {
        self.records
            .remove(token)
            .map(|(_, records)| records.len())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_token(&self, token: &str) -> bool {
        self.records.contains_key(token)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::Relaxed)
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, TokenStoreError> {
        self.create_calls.fetch_add(1, Ordering::Relaxed);
        self.records
            .entry(record.token.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn find_one(&self, query: &TokenQuery) -> Result<Option<TokenRecord>, TokenStoreError> {
        self.find_calls.fetch_add(1, Ordering::Relaxed);
        let found = self
            .records
            .get(&query.token)
            .and_then(|entry| entry.iter().find(|r| query.matches(r)).cloned());
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(token: &str, subject: &str, token_type: TokenType) -> TokenRecord {
        TokenRecord {
            token: token.to_string(),
            subject: Subject::from(subject),
            expires: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            token_type,
            blacklisted: false,
        }
    }

    fn query(token: &str, subject: &str, token_type: TokenType) -> TokenQuery {
        TokenQuery {
            token: token.to_string(),
            token_type,
            subject: Subject::from(subject),
            blacklisted: false,
        }
    }

    #[tokio::test]
    async fn find_one_requires_all_fields_to_match() {
        let store = MemoryTokenStore::new();
        store.create(record("t1", "alice", TokenType::refresh())).await.unwrap();

        let hit = store.find_one(&query("t1", "alice", TokenType::refresh())).await.unwrap();
        assert!(hit.is_some());

        let wrong_type = store.find_one(&query("t1", "alice", TokenType::access())).await.unwrap();
        assert!(wrong_type.is_none());

        let wrong_subject = store.find_one(&query("t1", "bob", TokenType::refresh())).await.unwrap();
        assert!(wrong_subject.is_none());

        let wrong_token = store.find_one(&query("t2", "alice", TokenType::refresh())).await.unwrap();
        assert!(wrong_token.is_none());

        assert_eq!(store.create_calls(), 1);
        assert_eq!(store.find_calls(), 4);
    }

    #[tokio::test]
    async fn blacklisted_records_are_hidden_from_live_lookup() {
        let store = MemoryTokenStore::new();
        store.create(record("t1", "alice", TokenType::refresh())).await.unwrap();
        assert_eq!(store.blacklist("t1"), 1);
        assert_eq!(store.blacklist("t1"), 0);

        let live = store.find_one(&query("t1", "alice", TokenType::refresh())).await.unwrap();
        assert!(live.is_none());

        let mut revoked = query("t1", "alice", TokenType::refresh());
        revoked.blacklisted = true;
        let found = store.find_one(&revoked).await.unwrap().unwrap();
        assert!(found.blacklisted);
    }

    #[tokio::test]
    async fn remove_deletes_all_records_for_token() {
        let store = MemoryTokenStore::new();
        store.create(record("t1", "alice", TokenType::refresh())).await.unwrap();
        store.create(record("t1", "alice", TokenType::refresh())).await.unwrap();
        store.create(record("t2", "bob", TokenType::refresh())).await.unwrap();
        assert_eq!(store.len(), 3);

        assert_eq!(store.remove("t1"), 2);
        assert!(!store.contains_token("t1"));
        assert!(store.contains_token("t2"));
        assert_eq!(store.remove("missing"), 0);
    }

    #[tokio::test]
    async fn expired_records_are_kept() {
        let store = MemoryTokenStore::new();
        let mut old = record("t1", "alice", TokenType::refresh());
        old.expires = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        store.create(old).await.unwrap();

        let found = store.find_one(&query("t1", "alice", TokenType::refresh())).await.unwrap();
        assert!(found.is_some());
    }
}
