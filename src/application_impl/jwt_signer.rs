use crate::application_port::TokenError;
use crate::domain_model::*;
use crate::domain_port::Clock;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;

/// Encode `payload` as an HS256 JWT.
pub fn sign(payload: &TokenPayload, secret: &[u8]) -> Result<String, TokenError> {
    if payload.sub.as_str().is_empty() {
        return Err(TokenError::Signing("empty subject".to_string()));
    }
    if payload.token_type.as_str().is_empty() {
        return Err(TokenError::Signing("empty token type".to_string()));
    }
    encode(
        &Header::new(Algorithm::HS256),
        payload,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Decode and check signature, then reject the token if `now >= exp`.
pub fn verify(token: &str, secret: &[u8], now: DateTime<Utc>) -> Result<TokenPayload, TokenError> {
    let mut v = Validation::new(Algorithm::HS256);
    // expiry is checked against the injected clock below, without leeway
    v.validate_exp = false;
    v.leeway = 0;
    let data = decode::<TokenPayload>(token, &DecodingKey::from_secret(secret), &v)
        .map_err(|_| TokenError::TokenInvalidOrExpired)?;
    if now.timestamp() >= data.claims.exp {
        return Err(TokenError::TokenInvalidOrExpired);
    }
    Ok(data.claims)
}

pub struct JwtSigner {
    clock: Arc<dyn Clock>,
}

impl JwtSigner {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        JwtSigner { clock }
    }

    pub fn sign(
        &self,
        subject: &Subject,
        expires: DateTime<Utc>,
        token_type: &TokenType,
        secret: &str,
    ) -> Result<String, TokenError> {
        let payload = TokenPayload {
            sub: subject.clone(),
            iat: self.clock.now().timestamp(),
            exp: expires.timestamp(),
            token_type: token_type.clone(),
        };
        sign(&payload, secret.as_bytes())
    }

    pub fn verify(&self, token: &str, secret: &str) -> Result<TokenPayload, TokenError> {
        verify(token, secret.as_bytes(), self.clock.now())
    }
}
