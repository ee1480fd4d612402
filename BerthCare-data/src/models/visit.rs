use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use super::patch::double_option;

text_enum! {
    /// Offline sync state of a visit record
    pub enum VisitSyncStatus {
        Local => "local",
        Syncing => "syncing",
        Synced => "synced",
        Conflict => "conflict",
    }
}

/// Documentation of a visit carried out against a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: String,
    pub schedule_id: String,
    pub caregiver_id: String,
    pub client_id: String,
    pub visit_date: NaiveDate,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub documentation: JsonValue,
    pub photo_ids: Vec<String>,
    pub location: Option<JsonValue>,
    pub changed_fields: Vec<String>,
    pub copied_from_visit_id: Option<String>,
    pub sync_status: VisitSyncStatus,
    pub synced_at: Option<DateTime<Utc>>,
    pub sync_version: i64,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVisit {
    #[validate(length(min = 1))]
    pub schedule_id: String,
    #[validate(length(min = 1))]
    pub caregiver_id: String,
    #[validate(length(min = 1))]
    pub client_id: String,
    pub visit_date: NaiveDate,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub documentation: Option<JsonValue>,
    #[serde(default)]
    pub photo_ids: Vec<String>,
    pub location: Option<JsonValue>,
    #[serde(default)]
    pub changed_fields: Vec<String>,
    pub copied_from_visit_id: Option<String>,
    pub sync_status: Option<VisitSyncStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisit {
    pub visit_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_time: Option<Option<DateTime<Utc>>>,
    pub documentation: Option<JsonValue>,
    pub photo_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<JsonValue>>,
    pub changed_fields: Option<Vec<String>>,
    pub sync_status: Option<VisitSyncStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub synced_at: Option<Option<DateTime<Utc>>>,
    #[validate(range(min = 0))]
    pub sync_version: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitFilter {
    pub schedule_id: Option<String>,
    pub caregiver_id: Option<String>,
    pub client_id: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub sync_status: Option<VisitSyncStatus>,
}
