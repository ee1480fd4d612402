use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

text_enum! {
    /// Role of a staff member within an organization
    pub enum CaregiverRole {
        Caregiver => "caregiver",
        Coordinator => "coordinator",
    }
}

/// A caregiver or coordinator account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caregiver {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub organization_id: String,
    pub role: CaregiverRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCaregiver {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 40))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub organization_id: String,
    pub role: CaregiverRole,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaregiver {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 40))]
    pub phone: Option<String>,
    #[validate(length(min = 1))]
    pub organization_id: Option<String>,
    pub role: Option<CaregiverRole>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverFilter {
    pub email: Option<String>,
    pub organization_id: Option<String>,
    pub role: Option<CaregiverRole>,
}
