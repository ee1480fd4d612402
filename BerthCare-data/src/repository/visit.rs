use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, instrument};

use super::entity::{push_eq, Assignments, DeletionPolicy, Entity};
use super::errors::RepositoryError;
use super::sqlite::{select_by_id, select_where, update_visible, SqliteRepository};
use crate::models::codec;
use crate::models::{NewVisit, UpdateVisit, Visit, VisitFilter, VisitSyncStatus};

pub type VisitRepository = SqliteRepository<Visit>;

impl Entity for Visit {
    type Create = NewVisit;
    type Update = UpdateVisit;
    type Filter = VisitFilter;

    const NAME: &'static str = "Visit";
    const TABLE: &'static str = "visits";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "schedule_id",
        "caregiver_id",
        "client_id",
        "visit_date",
        "start_time",
        "end_time",
        "documentation",
        "photo_ids",
        "location",
        "changed_fields",
        "copied_from_visit_id",
        "sync_status",
        "synced_at",
        "sync_version",
        "deleted_at",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "visit_date DESC, created_at DESC, id ASC";
    const DELETION: DeletionPolicy = DeletionPolicy::Tombstone;
    const TRACKS_UPDATED_AT: bool = true;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Visit {
            id: row.get(0)?,
            schedule_id: row.get(1)?,
            caregiver_id: row.get(2)?,
            client_id: row.get(3)?,
            visit_date: row.get(4)?,
            start_time: row.get(5)?,
            end_time: row.get(6)?,
            documentation: codec::read_json(row, 7)?,
            photo_ids: codec::read_string_list(row, 8)?,
            location: codec::read_opt_json(row, 9)?,
            changed_fields: codec::read_string_list(row, 10)?,
            copied_from_visit_id: row.get(11)?,
            sync_status: row.get(12)?,
            synced_at: row.get(13)?,
            sync_version: row.get(14)?,
            deleted_at: row.get(15)?,
            created_at: row.get(16)?,
            updated_at: row.get(17)?,
        })
    }

    fn insert_values(data: NewVisit, _now: DateTime<Utc>) -> Result<Assignments, RepositoryError> {
        let documentation = data
            .documentation
            .unwrap_or_else(|| JsonValue::Object(Map::new()));
        ensure_object(&documentation)?;

        Ok(vec![
            ("schedule_id", codec::text(data.schedule_id)),
            ("caregiver_id", codec::text(data.caregiver_id)),
            ("client_id", codec::text(data.client_id)),
            ("visit_date", codec::date(data.visit_date)),
            ("start_time", codec::opt_timestamp(data.start_time)),
            ("end_time", codec::opt_timestamp(data.end_time)),
            ("documentation", codec::json(&documentation)),
            ("photo_ids", codec::string_list(data.photo_ids)),
            ("location", codec::opt_json(data.location)),
            ("changed_fields", codec::string_list(data.changed_fields)),
            ("copied_from_visit_id", codec::opt_text(data.copied_from_visit_id)),
            ("sync_status", data.sync_status.unwrap_or(VisitSyncStatus::Local).into()),
        ])
    }

    fn update_values(data: UpdateVisit) -> Result<Assignments, RepositoryError> {
        let mut values = Assignments::new();
        if let Some(date) = data.visit_date {
            values.push(("visit_date", codec::date(date)));
        }
        if let Some(start_time) = data.start_time {
            values.push(("start_time", codec::opt_timestamp(start_time)));
        }
        if let Some(end_time) = data.end_time {
            values.push(("end_time", codec::opt_timestamp(end_time)));
        }
        if let Some(documentation) = data.documentation {
            ensure_object(&documentation)?;
            values.push(("documentation", codec::json(&documentation)));
        }
        if let Some(photo_ids) = data.photo_ids {
            values.push(("photo_ids", codec::string_list(photo_ids)));
        }
        if let Some(location) = data.location {
            values.push(("location", codec::opt_json(location)));
        }
        if let Some(changed_fields) = data.changed_fields {
            values.push(("changed_fields", codec::string_list(changed_fields)));
        }
        if let Some(sync_status) = data.sync_status {
            values.push(("sync_status", sync_status.into()));
        }
        if let Some(synced_at) = data.synced_at {
            values.push(("synced_at", codec::opt_timestamp(synced_at)));
        }
        if let Some(sync_version) = data.sync_version {
            values.push(("sync_version", codec::integer(sync_version)));
        }
        Ok(values)
    }

    fn filter_conditions(filter: &VisitFilter) -> Assignments {
        let mut conditions = Assignments::new();
        push_eq(&mut conditions, "schedule_id", &filter.schedule_id);
        push_eq(&mut conditions, "caregiver_id", &filter.caregiver_id);
        push_eq(&mut conditions, "client_id", &filter.client_id);
        if let Some(date) = filter.visit_date {
            conditions.push(("visit_date", codec::date(date)));
        }
        push_eq(&mut conditions, "sync_status", &filter.sync_status);
        conditions
    }
}

impl SqliteRepository<Visit> {
    /// Most recent visible visit for a client by visit date
    #[instrument(skip(self))]
    pub async fn find_last_by_client(&self, client_id: &str) -> Result<Option<Visit>, RepositoryError> {
        let conditions = vec![("client_id", codec::text(client_id))];
        self.database()
            .with_connection(move |conn| {
                Ok(select_where::<Visit>(conn, conditions, true, None)?
                    .into_iter()
                    .next())
            })
            .await
    }

    /// Deep-merge `patch` into a visible visit's documentation.
    ///
    /// Nested objects merge key by key; any other value replaces what was stored.
    #[instrument(skip(self, patch))]
    pub async fn update_documentation(&self, id: &str, patch: JsonValue) -> Result<Visit, RepositoryError> {
        let JsonValue::Object(patch) = patch else {
            return Err(RepositoryError::Validation(
                "documentation patch must be a JSON object".to_string(),
            ));
        };
        let id = id.to_string();

        self.database()
            .with_connection(move |conn| {
                let tx = conn.transaction()?;

                let existing = select_by_id::<Visit>(&tx, &id, true)?
                    .ok_or_else(|| RepositoryError::not_found(Visit::NAME, id.clone()))?;

                let mut documentation = match existing.documentation {
                    JsonValue::Object(map) => map,
                    _ => Map::new(),
                };
                merge_objects(&mut documentation, patch);

                let merged = JsonValue::Object(documentation);
                update_visible::<Visit>(&tx, &id, vec![("documentation", codec::json(&merged))], Utc::now())?;

                let updated = select_by_id::<Visit>(&tx, &id, false)?
                    .ok_or_else(|| RepositoryError::not_found(Visit::NAME, id.clone()))?;
                tx.commit()?;

                debug!("Merged documentation for visit {}", id);
                Ok(updated)
            })
            .await
    }
}

/// Recursive object merge: objects merge, everything else replaces
pub fn merge_objects(target: &mut Map<String, JsonValue>, patch: Map<String, JsonValue>) {
    for (key, value) in patch {
        if let JsonValue::Object(incoming) = value {
            if let Some(JsonValue::Object(existing)) = target.get_mut(&key) {
                merge_objects(existing, incoming);
                continue;
            }
            target.insert(key, JsonValue::Object(incoming));
        } else {
            target.insert(key, value);
        }
    }
}

fn ensure_object(value: &JsonValue) -> Result<(), RepositoryError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(RepositoryError::Validation(
            "visit documentation must be a JSON object".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{memory_db, new_schedule, new_visit, seed_people};
    use crate::repository::{EntityRepository, ScheduleRepository};
    use crate::database::Database;
    use serde_json::json;

    async fn seed_visit(db: &Database, date: &str, time: &str) -> Visit {
        let (caregiver, client) = seed_people(db).await;
        let schedule = ScheduleRepository::new(db.clone())
            .create(new_schedule(&caregiver.id, &client.id, date, time))
            .await
            .unwrap();
        VisitRepository::new(db.clone())
            .create(new_visit(&schedule, date))
            .await
            .unwrap()
    }

    #[test]
    fn test_merge_objects_recurses_into_objects_only() {
        let mut current = json!({
            "vitals": { "pulse": 70, "bp": "120/80" },
            "tasks": ["meds", "meal"],
            "notes": "calm"
        })
        .as_object()
        .cloned()
        .unwrap();

        let patch = json!({
            "vitals": { "pulse": 82 },
            "tasks": ["walk"],
            "mood": "good"
        })
        .as_object()
        .cloned()
        .unwrap();

        merge_objects(&mut current, patch);

        assert_eq!(
            JsonValue::Object(current),
            json!({
                "vitals": { "pulse": 82, "bp": "120/80" },
                "tasks": ["walk"],
                "notes": "calm",
                "mood": "good"
            })
        );
    }

    #[tokio::test]
    async fn test_create_visit_defaults() {
        let db = memory_db().await;
        let visit = seed_visit(&db, "2024-06-01", "09:00").await;

        assert_eq!(visit.documentation, json!({}));
        assert!(visit.photo_ids.is_empty());
        assert_eq!(visit.sync_status, VisitSyncStatus::Local);
        assert_eq!(visit.sync_version, 0);
    }

    #[tokio::test]
    async fn test_update_documentation_merges_and_persists() {
        let db = memory_db().await;
        let visit = seed_visit(&db, "2024-06-01", "09:00").await;
        let repo = VisitRepository::new(db);

        repo.update_documentation(&visit.id, json!({ "vitals": { "pulse": 70, "temp": 36.6 } }))
            .await
            .unwrap();
        let updated = repo
            .update_documentation(&visit.id, json!({ "vitals": { "pulse": 75 }, "notes": "ok" }))
            .await
            .unwrap();

        assert_eq!(
            updated.documentation,
            json!({ "vitals": { "pulse": 75, "temp": 36.6 }, "notes": "ok" })
        );

        let reloaded = repo.find_by_id(&visit.id).await.unwrap().unwrap();
        assert_eq!(reloaded.documentation, updated.documentation);
    }

    #[tokio::test]
    async fn test_update_documentation_on_deleted_visit_is_not_found() {
        let db = memory_db().await;
        let visit = seed_visit(&db, "2024-06-01", "09:00").await;
        let repo = VisitRepository::new(db);
        repo.soft_delete(&visit.id).await.unwrap();

        let err = repo
            .update_documentation(&visit.id, json!({ "notes": "late" }))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_documentation_rejects_non_object_patch() {
        let db = memory_db().await;
        let visit = seed_visit(&db, "2024-06-01", "09:00").await;
        let repo = VisitRepository::new(db);

        let err = repo
            .update_documentation(&visit.id, json!(["not", "an", "object"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_find_last_by_client_skips_deleted_visits() {
        let db = memory_db().await;
        let (caregiver, client) = seed_people(&db).await;
        let schedules = ScheduleRepository::new(db.clone());
        let visits = VisitRepository::new(db);

        let mut created = Vec::new();
        for date in ["2024-06-01", "2024-06-03", "2024-06-02"] {
            let schedule = schedules
                .create(new_schedule(&caregiver.id, &client.id, date, "09:00"))
                .await
                .unwrap();
            created.push(visits.create(new_visit(&schedule, date)).await.unwrap());
        }

        let latest = visits.find_last_by_client(&client.id).await.unwrap().unwrap();
        assert_eq!(latest.id, created[1].id);

        visits.soft_delete(&created[1].id).await.unwrap();
        let latest = visits.find_last_by_client(&client.id).await.unwrap().unwrap();
        assert_eq!(latest.id, created[2].id);
    }

    #[tokio::test]
    async fn test_second_visit_for_schedule_is_rejected() {
        let db = memory_db().await;
        let (caregiver, client) = seed_people(&db).await;
        let schedule = ScheduleRepository::new(db.clone())
            .create(new_schedule(&caregiver.id, &client.id, "2024-06-01", "09:00"))
            .await
            .unwrap();
        let visits = VisitRepository::new(db);

        visits.create(new_visit(&schedule, "2024-06-01")).await.unwrap();
        let err = visits
            .create(new_visit(&schedule, "2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
    }
}
