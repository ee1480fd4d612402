use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::entity::{push_eq, Assignments, DeletionPolicy, Entity};
use super::errors::RepositoryError;
use super::sqlite::SqliteRepository;
use crate::models::codec;
use crate::models::{AuditLog, AuditLogFilter, NewAuditLog, UpdateAuditLog};

pub type AuditLogRepository = SqliteRepository<AuditLog>;

impl Entity for AuditLog {
    type Create = NewAuditLog;
    type Update = UpdateAuditLog;
    type Filter = AuditLogFilter;

    const NAME: &'static str = "AuditLog";
    const TABLE: &'static str = "audit_logs";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "entity_type",
        "entity_id",
        "action",
        "actor_id",
        "actor_type",
        "before",
        "after",
        "ip_address",
        "user_agent",
        "device_id",
        "created_at",
    ];
    const ORDER_BY: &'static str = "created_at ASC, id ASC";
    const DELETION: DeletionPolicy = DeletionPolicy::Purge;
    const TRACKS_UPDATED_AT: bool = false;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AuditLog {
            id: row.get(0)?,
            entity_type: row.get(1)?,
            entity_id: row.get(2)?,
            action: row.get(3)?,
            actor_id: row.get(4)?,
            actor_type: row.get(5)?,
            before: codec::read_opt_json(row, 6)?,
            after: codec::read_opt_json(row, 7)?,
            ip_address: row.get(8)?,
            user_agent: row.get(9)?,
            device_id: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    fn insert_values(data: NewAuditLog, _now: DateTime<Utc>) -> Result<Assignments, RepositoryError> {
        Ok(vec![
            ("entity_type", codec::text(data.entity_type)),
            ("entity_id", codec::text(data.entity_id)),
            ("action", codec::text(data.action)),
            ("actor_id", codec::text(data.actor_id)),
            ("actor_type", data.actor_type.into()),
            ("before", codec::opt_json(data.before)),
            ("after", codec::opt_json(data.after)),
            ("ip_address", codec::opt_text(data.ip_address)),
            ("user_agent", codec::opt_text(data.user_agent)),
            ("device_id", codec::text(data.device_id)),
        ])
    }

    fn update_values(data: UpdateAuditLog) -> Result<Assignments, RepositoryError> {
        let mut values = Assignments::new();
        if let Some(action) = data.action {
            values.push(("action", codec::text(action)));
        }
        if let Some(before) = data.before {
            values.push(("before", codec::opt_json(before)));
        }
        if let Some(after) = data.after {
            values.push(("after", codec::opt_json(after)));
        }
        if let Some(ip_address) = data.ip_address {
            values.push(("ip_address", codec::opt_text(ip_address)));
        }
        if let Some(user_agent) = data.user_agent {
            values.push(("user_agent", codec::opt_text(user_agent)));
        }
        Ok(values)
    }

    fn filter_conditions(filter: &AuditLogFilter) -> Assignments {
        let mut conditions = Assignments::new();
        push_eq(&mut conditions, "entity_type", &filter.entity_type);
        push_eq(&mut conditions, "entity_id", &filter.entity_id);
        push_eq(&mut conditions, "actor_id", &filter.actor_id);
        push_eq(&mut conditions, "action", &filter.action);
        conditions
    }
}
