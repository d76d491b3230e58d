use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub(crate) const REFRESH_ROLE: &str = "refresh";

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token has expired")]
    Expired,

    #[error("invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    pub(crate) iat: i64,
    pub(crate) nbf: i64,
    pub(crate) exp: i64,
    pub(crate) jti: String,
}

impl Claims {
    pub(crate) fn is_refresh(&self) -> bool {
        self.role.as_deref() == Some(REFRESH_ROLE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct TokenPair {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    pub(crate) token_type: String,
    pub(crate) expires_in: i64,
}

pub(crate) struct JwtService {
    secret: String,
    ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl JwtService {
    const DEFAULT_TTL_SECONDS: i64 = 60 * 60;
    const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

    pub(crate) fn new(secret: &str, ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };
        let refresh_ttl_seconds = if refresh_ttl_seconds > 0 {
            refresh_ttl_seconds
        } else {
            Self::DEFAULT_REFRESH_TTL_SECONDS
        };

        JwtService {
            secret: secret.into(),
            ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    #[cfg(test)]
    pub(crate) fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        role: Option<&str>,
    ) -> Result<String, JwtError> {
        self.generate_token_at(user_id, username, role, self.ttl_seconds, Utc::now())
    }

    /// Access token plus a longer-lived token carrying the `refresh` role.
    pub(crate) fn generate_token_pair(
        &self,
        user_id: i64,
        username: &str,
        role: Option<&str>,
    ) -> Result<TokenPair, JwtError> {
        let now = Utc::now();
        let access_token = self.generate_token_at(user_id, username, role, self.ttl_seconds, now)?;
        let refresh_token = self.generate_token_at(
            user_id,
            username,
            Some(REFRESH_ROLE),
            self.refresh_ttl_seconds,
            now,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.ttl_seconds,
        })
    }

    pub(crate) fn generate_token_at(
        &self,
        user_id: i64,
        username: &str,
        role: Option<&str>,
        ttl_seconds: i64,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            user_id,
            username: username.into(),
            role: role.map(str::to_string),
            iat,
            nbf: iat,
            exp: (issued_at + Duration::seconds(ttl_seconds)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Encode)
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e),
        })?;

        Ok(token_data.claims)
    }
}
