use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use tracing::instrument;

use super::entity::{push_eq, Assignments, DeletionPolicy, Entity};
use super::errors::RepositoryError;
use super::sqlite::{select_where, SqliteRepository};
use crate::models::codec;
use crate::models::{NewSchedule, Schedule, ScheduleFilter, ScheduleStatus, UpdateSchedule};

pub type ScheduleRepository = SqliteRepository<Schedule>;

impl Entity for Schedule {
    type Create = NewSchedule;
    type Update = UpdateSchedule;
    type Filter = ScheduleFilter;

    const NAME: &'static str = "Schedule";
    const TABLE: &'static str = "schedules";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "caregiver_id",
        "client_id",
        "scheduled_date",
        "scheduled_time",
        "duration_minutes",
        "status",
        "completed_at",
        "deleted_at",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "scheduled_date ASC, scheduled_time ASC, id ASC";
    const DELETION: DeletionPolicy = DeletionPolicy::Tombstone;
    const TRACKS_UPDATED_AT: bool = true;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Schedule {
            id: row.get(0)?,
            caregiver_id: row.get(1)?,
            client_id: row.get(2)?,
            scheduled_date: row.get(3)?,
            scheduled_time: row.get(4)?,
            duration_minutes: row.get(5)?,
            status: row.get(6)?,
            completed_at: row.get(7)?,
            deleted_at: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn insert_values(data: NewSchedule, _now: DateTime<Utc>) -> Result<Assignments, RepositoryError> {
        Ok(vec![
            ("caregiver_id", codec::text(data.caregiver_id)),
            ("client_id", codec::text(data.client_id)),
            ("scheduled_date", codec::date(data.scheduled_date)),
            ("scheduled_time", codec::time(data.scheduled_time)),
            ("duration_minutes", codec::integer(data.duration_minutes)),
            ("status", data.status.unwrap_or(ScheduleStatus::Scheduled).into()),
        ])
    }

    fn update_values(data: UpdateSchedule) -> Result<Assignments, RepositoryError> {
        let mut values = Assignments::new();
        if let Some(caregiver_id) = data.caregiver_id {
            values.push(("caregiver_id", codec::text(caregiver_id)));
        }
        if let Some(client_id) = data.client_id {
            values.push(("client_id", codec::text(client_id)));
        }
        if let Some(date) = data.scheduled_date {
            values.push(("scheduled_date", codec::date(date)));
        }
        if let Some(time) = data.scheduled_time {
            values.push(("scheduled_time", codec::time(time)));
        }
        if let Some(duration) = data.duration_minutes {
            values.push(("duration_minutes", codec::integer(duration)));
        }
        if let Some(status) = data.status {
            values.push(("status", status.into()));
        }
        if let Some(completed_at) = data.completed_at {
            values.push(("completed_at", codec::opt_timestamp(completed_at)));
        }
        Ok(values)
    }

    fn filter_conditions(filter: &ScheduleFilter) -> Assignments {
        let mut conditions = Assignments::new();
        push_eq(&mut conditions, "caregiver_id", &filter.caregiver_id);
        push_eq(&mut conditions, "client_id", &filter.client_id);
        if let Some(date) = filter.scheduled_date {
            conditions.push(("scheduled_date", codec::date(date)));
        }
        push_eq(&mut conditions, "status", &filter.status);
        conditions
    }
}

impl SqliteRepository<Schedule> {
    /// A caregiver's visible schedules on one day, earliest first
    #[instrument(skip(self))]
    pub async fn find_by_date_and_caregiver(
        &self,
        caregiver_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Schedule>, RepositoryError> {
        let conditions = vec![
            ("caregiver_id", codec::text(caregiver_id)),
            ("scheduled_date", codec::date(date)),
        ];
        self.database()
            .with_connection(move |conn| {
                select_where::<Schedule>(conn, conditions, true, Some("scheduled_time ASC, id ASC"))
            })
            .await
    }
}
