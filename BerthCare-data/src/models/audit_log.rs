use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use super::patch::double_option;

text_enum! {
    /// Who performed an audited action
    pub enum ActorType {
        Caregiver => "caregiver",
        Coordinator => "coordinator",
        System => "system",
    }
}

/// Immutable record of a change to another entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub action: String,
    pub actor_id: String,
    pub actor_type: ActorType,
    pub before: Option<JsonValue>,
    pub after: Option<JsonValue>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditLog {
    #[validate(length(min = 1))]
    pub entity_type: String,
    #[validate(length(min = 1))]
    pub entity_id: String,
    #[validate(length(min = 1))]
    pub action: String,
    #[validate(length(min = 1))]
    pub actor_id: String,
    pub actor_type: ActorType,
    pub before: Option<JsonValue>,
    pub after: Option<JsonValue>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[validate(length(min = 1))]
    pub device_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuditLog {
    #[validate(length(min = 1))]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub before: Option<Option<JsonValue>>,
    #[serde(default, deserialize_with = "double_option")]
    pub after: Option<Option<JsonValue>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ip_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_agent: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub actor_id: Option<String>,
    pub action: Option<String>,
}
