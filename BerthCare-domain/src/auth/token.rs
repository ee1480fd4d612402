use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use super::AuthError;
use crate::config::AuthConfig;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub sub: String,
    pub device_id: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub sub: String,
    pub device_id: String,
    /// Key of the token's row in the refresh token store
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// An encoded token and when it stops being accepted
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Signs and verifies tokens with the configured HMAC secret
#[derive(Debug, Clone)]
pub struct TokenSigner {
    config: AuthConfig,
}

impl TokenSigner {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    fn secret(&self) -> Result<&[u8], AuthError> {
        self.config
            .jwt_secret
            .as_deref()
            .map(str::as_bytes)
            .ok_or(AuthError::NotConfigured)
    }

    pub fn sign_access(&self, user_id: &str, device_id: &str, now: DateTime<Utc>) -> Result<SignedToken, AuthError> {
        let expires_at = now + Duration::seconds(self.config.access_ttl_seconds);
        let claims = AccessClaims {
            sub: user_id.to_string(),
            device_id: device_id.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        self.sign(&claims, expires_at)
    }

    pub fn sign_refresh(
        &self,
        user_id: &str,
        device_id: &str,
        jti: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedToken, AuthError> {
        let expires_at = now + Duration::seconds(self.config.refresh_ttl_seconds);
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            device_id: device_id.to_string(),
            jti: jti.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        self.sign(&claims, expires_at)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.verify(token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        self.verify(token)
    }

    fn sign<C: Serialize>(&self, claims: &C, expires_at: DateTime<Utc>) -> Result<SignedToken, AuthError> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(self.secret()?))
            .map_err(|e| {
                error!("Failed to encode JWT: {}", e);
                AuthError::Signing(e.to_string())
            })?;
        Ok(SignedToken { token, expires_at })
    }

    fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<C>(token, &DecodingKey::from_secret(self.secret()?), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => {
                    debug!("Token rejected: {}", e);
                    AuthError::InvalidToken
                }
            })
    }
}

/// Hex SHA-256 digest under which a refresh token is stored
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
