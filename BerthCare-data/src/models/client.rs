use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::patch::double_option;

/// A person receiving care
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub organization_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(url)]
    pub photo_url: Option<String>,
    #[validate(length(min = 1))]
    pub address: String,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    #[validate(length(min = 1))]
    pub organization_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClient {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub photo_url: Option<Option<String>>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub emergency_contact: Option<Option<String>>,
    #[validate(length(min = 1))]
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFilter {
    pub organization_id: Option<String>,
    pub name: Option<String>,
}
