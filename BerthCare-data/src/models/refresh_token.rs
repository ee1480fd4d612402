use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A device-bound refresh token, keyed by its JWT id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// JWT id of the token currently issued to the device
    pub id: String,
    pub user_id: String,
    pub device_id: String,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub replaced_by_jti: Option<String>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for issuing or rotating a device's refresh token
#[derive(Debug, Clone)]
pub struct UpsertRefreshToken {
    pub jti: String,
    pub user_id: String,
    pub device_id: String,
    pub token_hash: String,
    /// Defaults to the time of the upsert
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}
