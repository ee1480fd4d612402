use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::patch::double_option;

text_enum! {
    /// Lifecycle of a scheduled visit slot
    pub enum ScheduleStatus {
        Scheduled => "scheduled",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

/// A planned visit slot for a caregiver at a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub caregiver_id: String,
    pub client_id: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub duration_minutes: i64,
    pub status: ScheduleStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    #[validate(length(min = 1))]
    pub caregiver_id: String,
    #[validate(length(min = 1))]
    pub client_id: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i64,
    pub status: Option<ScheduleStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSchedule {
    #[validate(length(min = 1))]
    pub caregiver_id: Option<String>,
    #[validate(length(min = 1))]
    pub client_id: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i64>,
    pub status: Option<ScheduleStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFilter {
    pub caregiver_id: Option<String>,
    pub client_id: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub status: Option<ScheduleStatus>,
}
