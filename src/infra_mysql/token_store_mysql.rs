use super::util::is_dup_key;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlTokenStore {
    pool: MySqlPool,
}

/// `expires` is a `DATETIME(3)` column.
const EXPIRES_SUBSEC_DIGITS: u16 = 3;

fn to_column_precision(expires: DateTime<Utc>) -> DateTime<Utc> {
    expires.trunc_subsecs(EXPIRES_SUBSEC_DIGITS)
}

impl MySqlTokenStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlTokenStore { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<TokenRecord, TokenStoreError> {
        let token: String = row
            .try_get("token")
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        let subject: String = row
            .try_get("subject")
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        let expires: DateTime<Utc> = row
            .try_get("expires")
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        let token_type: String = row
            .try_get("type")
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        let blacklisted: bool = row
            .try_get("blacklisted")
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;

        Ok(TokenRecord {
            token,
            subject: Subject(subject),
            expires,
            token_type: TokenType(token_type),
            blacklisted,
        })
    }
}

#[async_trait::async_trait]
impl TokenStore for MySqlTokenStore {
    async fn create(&self, mut record: TokenRecord) -> Result<TokenRecord, TokenStoreError> {
        // return what a later lookup will read back
        record.expires = to_column_precision(record.expires);

        sqlx::query(
            r#"
INSERT INTO token (token, subject, expires, `type`, blacklisted)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(&record.token)
        .bind(record.subject.as_str())
        .bind(record.expires)
        .bind(record.token_type.as_str())
        .bind(record.blacklisted)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                TokenStoreError::Store(format!("duplicate token: {e}"))
            } else {
                TokenStoreError::Store(e.to_string())
            }
        })?;

        Ok(record)
    }

    async fn find_one(&self, query: &TokenQuery) -> Result<Option<TokenRecord>, TokenStoreError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT token, subject, expires, `type`, blacklisted
FROM token
WHERE token = ? AND `type` = ? AND subject = ? AND blacklisted = ?
LIMIT 1
"#,
        )
        .bind(&query.token)
        .bind(query.token_type.as_str())
        .bind(query.subject.as_str())
        .bind(query.blacklisted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TokenStoreError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn expires_is_truncated_to_milliseconds() {
        let expires = Utc
            .with_ymd_and_hms(2025, 6, 1, 8, 30, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();

        let stored = to_column_precision(expires);
        assert_eq!(stored.nanosecond(), 123_000_000);
        assert_eq!(stored.timestamp(), expires.timestamp());
    }

    #[test]
    fn whole_seconds_are_unchanged() {
        let expires = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        assert_eq!(to_column_precision(expires), expires);
    }
}
