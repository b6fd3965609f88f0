use super::{JwtSigner, SystemClock};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

impl From<TokenStoreError> for TokenError {
    fn from(error: TokenStoreError) -> Self {
        TokenError::Persistence(error.to_string())
    }
}

pub struct RealTokenService {
    store: Arc<dyn TokenStore>,
    token_types: TokenTypes,
    config: TokenConfig,
    clock: Arc<dyn Clock>,
    signer: JwtSigner,
}

impl RealTokenService {
    pub fn builder() -> TokenServiceBuilder {
        TokenServiceBuilder::default()
    }

    pub fn new(
        store: Arc<dyn TokenStore>,
        token_types: TokenTypes,
        config: TokenConfig,
    ) -> Result<Self, TokenError> {
        Self::builder()
            .store(store)
            .token_types(token_types)
            .config(config)
            .build()
    }

    pub fn token_types(&self) -> &TokenTypes {
        &self.token_types
    }

    fn access_expires(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, TokenError> {
        let lifetime = TimeDelta::try_minutes(self.config.access_expiration_minutes);
        expires_after(now, lifetime)
    }

    fn refresh_expires(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, TokenError> {
        let lifetime = TimeDelta::try_days(self.config.refresh_expiration_days);
        expires_after(now, lifetime)
    }
}

#[async_trait::async_trait]
impl TokenService for RealTokenService {
    fn generate_token(
        &self,
        subject: &Subject,
        expires: DateTime<Utc>,
        token_type: &TokenType,
        secret: Option<&str>,
    ) -> Result<String, TokenError> {
        let secret = secret.unwrap_or(&self.config.secret);
        self.signer.sign(subject, expires, token_type, secret)
    }

    async fn save_token(
        &self,
        token: &str,
        subject: &Subject,
        expires: DateTime<Utc>,
        token_type: &TokenType,
        blacklisted: bool,
    ) -> Result<TokenRecord, TokenError> {
        let record = TokenRecord {
            token: token.to_owned(),
            subject: subject.clone(),
            expires,
            token_type: token_type.clone(),
            blacklisted,
        };
        let stored = self.store.create(record).await.map_err(|e| {
            warn!(%subject, %token_type, "saving token failed: {}", e);
            TokenError::from(e)
        })?;
        Ok(stored)
    }

    async fn verify_token(
        &self,
        token: &str,
        token_type: &TokenType,
    ) -> Result<TokenRecord, TokenError> {
        let payload = self.signer.verify(token, &self.config.secret)?;

        let query = TokenQuery {
            token: token.to_owned(),
            token_type: token_type.clone(),
            subject: payload.sub,
            blacklisted: false,
        };
        let found = self.store.find_one(&query).await.map_err(|e| {
            warn!(subject = %query.subject, %token_type, "token lookup failed: {}", e);
            TokenError::from(e)
        })?;

        match found {
            Some(record) => {
                debug!(subject = %record.subject, %token_type, "token verified");
                Ok(record)
            }
            None => {
                debug!(subject = %query.subject, %token_type, "no live token record");
                Err(TokenError::TokenNotFound)
            }
        }
    }

    async fn generate_auth_tokens(&self, subject: &Subject) -> Result<AuthTokens, TokenError> {
        let now = self.clock.now();

        let access_expires = self.access_expires(now)?;
        let access_token =
            self.generate_token(subject, access_expires, &self.token_types.access, None)?;

        let refresh_expires = self.refresh_expires(now)?;
        let refresh_token =
            self.generate_token(subject, refresh_expires, &self.token_types.refresh, None)?;
        self.save_token(
            &refresh_token,
            subject,
            refresh_expires,
            &self.token_types.refresh,
            false,
        )
        .await?;

        debug!(%subject, "auth tokens issued");

        Ok(AuthTokens {
            access: TokenGrant {
                token: access_token,
                expires: access_expires,
            },
            refresh: TokenGrant {
                token: refresh_token,
                expires: refresh_expires,
            },
        })
    }
}

/// Collects the service's collaborators; `build` fails on the first one missing.
#[derive(Default)]
pub struct TokenServiceBuilder {
    store: Option<Arc<dyn TokenStore>>,
    token_types: Option<TokenTypes>,
    config: Option<TokenConfig>,
    clock: Option<Arc<dyn Clock>>,
}

impl TokenServiceBuilder {
    pub fn store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn token_types(mut self, token_types: TokenTypes) -> Self {
        self.token_types = Some(token_types);
        self
    }

    pub fn config(mut self, config: TokenConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<RealTokenService, TokenError> {
        let store = self
            .store
            .ok_or_else(|| TokenError::Construction("missing token store".to_string()))?;
        let token_types = self
            .token_types
            .ok_or_else(|| TokenError::Construction("missing token types".to_string()))?;
        let config = self
            .config
            .ok_or_else(|| TokenError::Construction("missing config".to_string()))?;
        validate_config(&config)?;
        validate_token_types(&token_types)?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(RealTokenService {
            store,
            token_types,
            config,
            signer: JwtSigner::new(clock.clone()),
            clock,
        })
    }
}

fn expires_after(
    now: DateTime<Utc>,
    lifetime: Option<TimeDelta>,
) -> Result<DateTime<Utc>, TokenError> {
    lifetime
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| TokenError::Signing("token lifetime out of range".to_string()))
}

fn validate_config(config: &TokenConfig) -> Result<(), TokenError> {
    if config.secret.is_empty() {
        return Err(TokenError::Construction("missing signing secret".to_string()));
    }
    if config.access_expiration_minutes <= 0 {
        return Err(TokenError::Construction(
            "access_expiration_minutes must be positive".to_string(),
        ));
    }
    if config.refresh_expiration_days <= 0 {
        return Err(TokenError::Construction(
            "refresh_expiration_days must be positive".to_string(),
        ));
    }
    if TimeDelta::try_minutes(config.access_expiration_minutes).is_none()
        || TimeDelta::try_days(config.refresh_expiration_days).is_none()
    {
        return Err(TokenError::Construction(
            "token lifetime out of range".to_string(),
        ));
    }
    Ok(())
}

fn validate_token_types(types: &TokenTypes) -> Result<(), TokenError> {
    if types.access.as_str().is_empty() || types.refresh.as_str().is_empty() {
        return Err(TokenError::Construction("empty token type".to_string()));
    }
    if types.access == types.refresh {
        return Err(TokenError::Construction(
            "access and refresh types must differ".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryTokenStore;

    fn config() -> TokenConfig {
        TokenConfig {
            secret: "s".to_string(),
            access_expiration_minutes: 15,
            refresh_expiration_days: 30,
        }
    }

    fn expect_construction(result: Result<RealTokenService, TokenError>) -> String {
        match result {
            Err(TokenError::Construction(msg)) => msg,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("construction should fail"),
        }
    }

    #[test]
    fn build_fails_without_store() {
        let msg = expect_construction(
            RealTokenService::builder()
                .token_types(TokenTypes::default())
                .config(config())
                .build(),
        );
        assert!(msg.contains("store"));
    }

    #[test]
    fn build_fails_without_token_types() {
        let msg = expect_construction(
            RealTokenService::builder()
                .store(Arc::new(MemoryTokenStore::new()))
                .config(config())
                .build(),
        );
        assert!(msg.contains("types"));
    }

    #[test]
    fn build_fails_without_config() {
        let msg = expect_construction(
            RealTokenService::builder()
                .store(Arc::new(MemoryTokenStore::new()))
                .token_types(TokenTypes::default())
                .build(),
        );
        assert!(msg.contains("config"));
    }

    #[test]
    fn empty_secret_counts_as_missing() {
        let mut cfg = config();
        cfg.secret.clear();
        let msg = expect_construction(RealTokenService::new(
            Arc::new(MemoryTokenStore::new()),
            TokenTypes::default(),
            cfg,
        ));
        assert!(msg.contains("secret"));
    }

    #[test]
    fn non_positive_lifetimes_are_rejected() {
        let mut cfg = config();
        cfg.access_expiration_minutes = 0;
        expect_construction(RealTokenService::new(
            Arc::new(MemoryTokenStore::new()),
            TokenTypes::default(),
            cfg,
        ));

        let mut cfg = config();
        cfg.refresh_expiration_days = -1;
        expect_construction(RealTokenService::new(
            Arc::new(MemoryTokenStore::new()),
            TokenTypes::default(),
            cfg,
        ));
    }

    #[test]
    fn lifetime_beyond_time_delta_range_is_rejected() {
        let mut cfg = config();
        cfg.refresh_expiration_days = i64::MAX;
        let msg = expect_construction(RealTokenService::new(
            Arc::new(MemoryTokenStore::new()),
            TokenTypes::default(),
            cfg,
        ));
        assert!(msg.contains("out of range"));
    }

    #[tokio::test]
    async fn expiry_past_calendar_range_is_an_error_not_a_panic() {
        let store = Arc::new(MemoryTokenStore::new());
        let mut cfg = config();
        cfg.refresh_expiration_days = 100_000_000;
        let service = RealTokenService::new(store.clone(), TokenTypes::default(), cfg).unwrap();

        let err = service
            .generate_auth_tokens(&Subject::from("user123"))
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::Signing(ref msg) if msg.contains("out of range")));
        assert_eq!(store.create_calls(), 0);
    }

    #[test]
    fn identical_access_and_refresh_types_are_rejected() {
        expect_construction(RealTokenService::new(
            Arc::new(MemoryTokenStore::new()),
            TokenTypes::new(TokenType::access(), TokenType::access()),
            config(),
        ));
    }

    #[test]
    fn build_with_all_collaborators_succeeds() {
        let service = RealTokenService::new(
            Arc::new(MemoryTokenStore::new()),
            TokenTypes::default(),
            config(),
        )
        .unwrap();
        assert_eq!(service.token_types(), &TokenTypes::default());
    }
}
