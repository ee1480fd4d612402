use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::entity::{push_eq, Assignments, DeletionPolicy, Entity};
use super::errors::RepositoryError;
use super::sqlite::SqliteRepository;
use crate::models::codec;
use crate::models::{Alert, AlertFilter, NewAlert, UpdateAlert};

pub type AlertRepository = SqliteRepository<Alert>;

impl Entity for Alert {
    type Create = NewAlert;
    type Update = UpdateAlert;
    type Filter = AlertFilter;

    const NAME: &'static str = "Alert";
    const TABLE: &'static str = "alerts";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "caregiver_id",
        "client_id",
        "coordinator_id",
        "initiated_at",
        "call_duration",
        "note",
        "location",
        "deleted_at",
        "created_at",
    ];
    const ORDER_BY: &'static str = "initiated_at DESC, id ASC";
    const DELETION: DeletionPolicy = DeletionPolicy::Tombstone;
    const TRACKS_UPDATED_AT: bool = false;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Alert {
            id: row.get(0)?,
            caregiver_id: row.get(1)?,
            client_id: row.get(2)?,
            coordinator_id: row.get(3)?,
            initiated_at: row.get(4)?,
            call_duration: row.get(5)?,
            note: row.get(6)?,
            location: codec::read_opt_json(row, 7)?,
            deleted_at: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn insert_values(data: NewAlert, now: DateTime<Utc>) -> Result<Assignments, RepositoryError> {
        Ok(vec![
            ("caregiver_id", codec::text(data.caregiver_id)),
            ("client_id", codec::text(data.client_id)),
            ("coordinator_id", codec::text(data.coordinator_id)),
            ("initiated_at", codec::timestamp(data.initiated_at.unwrap_or(now))),
            ("call_duration", codec::opt_integer(data.call_duration)),
            ("note", codec::opt_text(data.note)),
            ("location", codec::opt_json(data.location)),
        ])
    }

    fn update_values(data: UpdateAlert) -> Result<Assignments, RepositoryError> {
        let mut values = Assignments::new();
        if let Some(call_duration) = data.call_duration {
            values.push(("call_duration", codec::opt_integer(call_duration)));
        }
        if let Some(note) = data.note {
            values.push(("note", codec::opt_text(note)));
        }
        if let Some(location) = data.location {
            values.push(("location", codec::opt_json(location)));
        }
        Ok(values)
    }

    fn filter_conditions(filter: &AlertFilter) -> Assignments {
        let mut conditions = Assignments::new();
        push_eq(&mut conditions, "caregiver_id", &filter.caregiver_id);
        push_eq(&mut conditions, "client_id", &filter.client_id);
        push_eq(&mut conditions, "coordinator_id", &filter.coordinator_id);
        conditions
    }
}
