use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::patch::double_option;

text_enum! {
    /// Upload state of a captured photo
    pub enum PhotoSyncStatus {
        Local => "local",
        Uploading => "uploading",
        Synced => "synced",
        Failed => "failed",
    }
}

/// Photo metadata captured during a visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub visit_id: String,
    pub client_id: String,
    pub caregiver_id: String,
    pub local_path: Option<String>,
    pub s3_key: Option<String>,
    pub mime_type: String,
    pub size_bytes: i64,
    pub compressed_size_bytes: i64,
    pub width: i64,
    pub height: i64,
    pub sync_status: PhotoSyncStatus,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    #[validate(length(min = 1))]
    pub visit_id: String,
    #[validate(length(min = 1))]
    pub client_id: String,
    #[validate(length(min = 1))]
    pub caregiver_id: String,
    pub local_path: Option<String>,
    pub s3_key: Option<String>,
    #[validate(length(min = 1))]
    pub mime_type: String,
    #[validate(range(min = 0))]
    pub size_bytes: i64,
    #[validate(range(min = 0))]
    pub compressed_size_bytes: i64,
    #[validate(range(min = 0))]
    pub width: i64,
    #[validate(range(min = 0))]
    pub height: i64,
    pub sync_status: Option<PhotoSyncStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhoto {
    #[serde(default, deserialize_with = "double_option")]
    pub local_path: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub s3_key: Option<Option<String>>,
    #[validate(range(min = 0))]
    pub compressed_size_bytes: Option<i64>,
    pub sync_status: Option<PhotoSyncStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub uploaded_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoFilter {
    pub visit_id: Option<String>,
    pub client_id: Option<String>,
    pub caregiver_id: Option<String>,
    pub sync_status: Option<PhotoSyncStatus>,
}
