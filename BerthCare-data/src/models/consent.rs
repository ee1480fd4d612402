use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::patch::double_option;

text_enum! {
    /// What a client has agreed to
    pub enum ConsentType {
        CareServices => "care_services",
        PhotoCapture => "photo_capture",
        DataSharing => "data_sharing",
        FamilyContact => "family_contact",
    }
}

/// A consent record signed by or for a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    pub id: String,
    pub client_id: String,
    pub caregiver_id: Option<String>,
    pub consent_type: ConsentType,
    pub granted: bool,
    pub granted_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub signature_url: Option<String>,
    pub witness_name: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewConsent {
    #[validate(length(min = 1))]
    pub client_id: String,
    pub caregiver_id: Option<String>,
    pub consent_type: ConsentType,
    #[serde(default)]
    pub granted: bool,
    pub granted_at: Option<DateTime<Utc>>,
    #[validate(url)]
    pub signature_url: Option<String>,
    pub witness_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConsent {
    pub granted: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub granted_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub revoked_at: Option<Option<DateTime<Utc>>>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub signature_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub witness_name: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentFilter {
    pub client_id: Option<String>,
    pub caregiver_id: Option<String>,
    pub consent_type: Option<ConsentType>,
    pub granted: Option<bool>,
}
