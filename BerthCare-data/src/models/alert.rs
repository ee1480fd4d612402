use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use super::patch::double_option;

/// An urgent call raised by a caregiver to their coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub caregiver_id: String,
    pub client_id: String,
    pub coordinator_id: String,
    pub initiated_at: DateTime<Utc>,
    pub call_duration: Option<i64>,
    pub note: Option<String>,
    pub location: Option<JsonValue>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    #[validate(length(min = 1))]
    pub caregiver_id: String,
    #[validate(length(min = 1))]
    pub client_id: String,
    #[validate(length(min = 1))]
    pub coordinator_id: String,
    /// Defaults to the insert time
    pub initiated_at: Option<DateTime<Utc>>,
    #[validate(range(min = 0))]
    pub call_duration: Option<i64>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
    pub location: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlert {
    #[validate(range(min = 0))]
    #[serde(default, deserialize_with = "double_option")]
    pub call_duration: Option<Option<i64>>,
    #[validate(length(max = 2000))]
    #[serde(default, deserialize_with = "double_option")]
    pub note: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<JsonValue>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertFilter {
    pub caregiver_id: Option<String>,
    pub client_id: Option<String>,
    pub coordinator_id: Option<String>,
}
