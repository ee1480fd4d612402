//! Refresh token issue, rotation and revocation over the token store.

use berthcare_data::models::UpsertRefreshToken;
use berthcare_data::repository::RefreshTokenRepository;
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::token::{hash_token, RefreshClaims, SignedToken, TokenSigner};
use super::AuthError;
use crate::config::AuthConfig;

/// A freshly issued refresh token
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub refresh_token: SignedToken,
    pub jti: String,
    pub issued_at: DateTime<Utc>,
}

/// Exchange of a refresh token for a new access token
#[derive(Clone)]
pub struct RefreshRequest {
    pub token: String,
    /// When present the token must have been issued to this device
    pub device_id: Option<String>,
    /// Also replace the refresh token
    pub rotate: bool,
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub access_token: SignedToken,
    /// Only set when the request asked for rotation
    pub refresh_token: Option<SignedToken>,
    /// Id of the refresh token now current for the device
    pub jti: String,
    pub user_id: String,
    pub device_id: String,
}

#[derive(Debug, Clone)]
pub struct RefreshService {
    tokens: RefreshTokenRepository,
    signer: TokenSigner,
}

impl RefreshService {
    pub fn new(tokens: RefreshTokenRepository, config: AuthConfig) -> Self {
        Self {
            tokens,
            signer: TokenSigner::new(config),
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Issue a refresh token for a user's device, replacing any token the
    /// device held before.
    #[instrument(skip_all)]
    pub async fn issue(&self, user_id: &str, device_id: &str) -> Result<IssuedRefreshToken, AuthError> {
        let jti = Uuid::new_v4().to_string();
        let issued_at = Utc::now();
        let refresh_token = self.signer.sign_refresh(user_id, device_id, &jti, issued_at)?;

        self.tokens
            .upsert_for_device(UpsertRefreshToken {
                jti: jti.clone(),
                user_id: user_id.to_string(),
                device_id: device_id.to_string(),
                token_hash: hash_token(&refresh_token.token),
                issued_at: Some(issued_at),
                expires_at: refresh_token.expires_at,
            })
            .await?;

        info!("Issued refresh token");
        Ok(IssuedRefreshToken {
            refresh_token,
            jti,
            issued_at,
        })
    }

    /// Check a presented refresh token against its signature and the store
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str, device_id: Option<&str>) -> Result<RefreshClaims, AuthError> {
        let claims = self.signer.verify_refresh(token)?;

        if device_id.is_some_and(|device| device != claims.device_id) {
            warn!("Refresh token presented by another device");
            return Err(AuthError::DeviceMismatch);
        }

        match self.tokens.find_valid_by_jti(&claims.jti, Utc::now()).await? {
            Some(stored) if stored.token_hash == hash_token(token) => Ok(claims),
            Some(_) => Err(AuthError::InvalidToken),
            None => match self.tokens.find_by_jti(&claims.jti).await? {
                Some(stored) if stored.revoked_at.is_some() => Err(AuthError::Revoked),
                Some(_) => Err(AuthError::Expired),
                None => Err(AuthError::NotFound),
            },
        }
    }

    /// Trade a refresh token for a new access token, rotating it on request.
    ///
    /// Rotation issues a new token for the same device. The store keeps one
    /// row per device, so the old token id stops resolving at once.
    #[instrument(skip_all, fields(rotate = request.rotate))]
    pub async fn refresh(&self, request: RefreshRequest) -> Result<RefreshOutcome, AuthError> {
        let claims = self.validate(&request.token, request.device_id.as_deref()).await?;
        let now = Utc::now();

        self.tokens.touch_last_used(&claims.jti, now).await?;
        let access_token = self.signer.sign_access(&claims.sub, &claims.device_id, now)?;

        if !request.rotate {
            return Ok(RefreshOutcome {
                access_token,
                refresh_token: None,
                jti: claims.jti,
                user_id: claims.sub,
                device_id: claims.device_id,
            });
        }

        let rotated = self.issue(&claims.sub, &claims.device_id).await?;
        Ok(RefreshOutcome {
            access_token,
            refresh_token: Some(rotated.refresh_token),
            jti: rotated.jti,
            user_id: claims.sub,
            device_id: claims.device_id,
        })
    }

    /// Revoke one token by id. Returns whether it existed.
    #[instrument(skip_all)]
    pub async fn revoke(&self, jti: &str) -> Result<bool, AuthError> {
        Ok(self.tokens.mark_revoked(jti, Utc::now(), None).await?)
    }

    #[instrument(skip_all)]
    pub async fn revoke_for_device(&self, user_id: &str, device_id: &str) -> Result<usize, AuthError> {
        let revoked = self.tokens.revoke_by_device(user_id, device_id, Utc::now()).await?;
        info!(revoked, "Revoked device refresh token");
        Ok(revoked)
    }

    #[instrument(skip_all)]
    pub async fn revoke_all_for_user(&self, user_id: &str) -> Result<usize, AuthError> {
        let revoked = self.tokens.revoke_all_for_user(user_id, Utc::now()).await?;
        info!(revoked, "Revoked all refresh tokens for user");
        Ok(revoked)
    }
}
