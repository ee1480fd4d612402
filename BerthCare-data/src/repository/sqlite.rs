//! Generic SQLite repository shared by every entity.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::entity::{Assignments, Entity};
use super::errors::RepositoryError;
use crate::database::Database;
use crate::models::codec;

/// Uniform CRUD contract over one entity
#[async_trait]
pub trait EntityRepository<E: Entity>: Send + Sync {
    /// Insert a record and return it as stored
    async fn create(&self, data: E::Create) -> Result<E, RepositoryError>;

    /// Look up a visible record
    async fn find_by_id(&self, id: &str) -> Result<Option<E>, RepositoryError>;

    /// Visible records matching every set filter field, in default order
    async fn find_many(&self, filter: E::Filter) -> Result<Vec<E>, RepositoryError>;

    /// Apply a partial update to a visible record
    async fn update(&self, id: &str, data: E::Update) -> Result<E, RepositoryError>;

    /// Remove a visible record according to the entity's deletion policy
    async fn soft_delete(&self, id: &str) -> Result<(), RepositoryError>;
}

/// [`EntityRepository`] backed by an injected [`Database`]
pub struct SqliteRepository<E> {
    db: Database,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for SqliteRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for SqliteRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteRepository")
            .field("entity", &E::NAME)
            .field("db", &self.db)
            .finish()
    }
}

impl<E: Entity> SqliteRepository<E> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Look up a record whether or not it has been soft deleted
    pub async fn find_by_id_including_removed(&self, id: &str) -> Result<Option<E>, RepositoryError> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| select_by_id::<E>(conn, &id, false))
            .await
    }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for SqliteRepository<E> {
    #[instrument(skip(self, data), fields(entity = E::NAME))]
    async fn create(&self, data: E::Create) -> Result<E, RepositoryError> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        let mut values: Assignments = vec![("id", codec::text(id.clone())), ("created_at", codec::timestamp(now))];
        if E::TRACKS_UPDATED_AT {
            values.push(("updated_at", codec::timestamp(now)));
        }
        values.extend(E::insert_values(data, now)?);

        self.db
            .with_connection(move |conn| {
                let columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
                let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
                let sql = format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    E::TABLE,
                    columns.join(", "),
                    placeholders.join(", ")
                );

                conn.execute(&sql, params_from_iter(values.into_iter().map(|(_, value)| value)))?;
                debug!("Created {} {}", E::NAME, id);

                select_by_id::<E>(conn, &id, false)?
                    .ok_or_else(|| RepositoryError::not_found(E::NAME, id))
            })
            .await
    }

    #[instrument(skip(self), fields(entity = E::NAME))]
    async fn find_by_id(&self, id: &str) -> Result<Option<E>, RepositoryError> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| select_by_id::<E>(conn, &id, true))
            .await
    }

    #[instrument(skip(self, filter), fields(entity = E::NAME))]
    async fn find_many(&self, filter: E::Filter) -> Result<Vec<E>, RepositoryError> {
        let conditions = E::filter_conditions(&filter);
        self.db
            .with_connection(move |conn| select_where::<E>(conn, conditions, true, None))
            .await
    }

    #[instrument(skip(self, data), fields(entity = E::NAME))]
    async fn update(&self, id: &str, data: E::Update) -> Result<E, RepositoryError> {
        let id = id.to_string();
        let changes = E::update_values(data)?;

        self.db
            .with_connection(move |conn| {
                if changes.is_empty() {
                    return select_by_id::<E>(conn, &id, true)?
                        .ok_or_else(|| RepositoryError::not_found(E::NAME, id));
                }

                let changed = update_visible::<E>(conn, &id, changes, Utc::now())?;
                if changed == 0 {
                    return Err(RepositoryError::not_found(E::NAME, id));
                }
                debug!("Updated {} {}", E::NAME, id);

                select_by_id::<E>(conn, &id, false)?
                    .ok_or_else(|| RepositoryError::not_found(E::NAME, id))
            })
            .await
    }

    #[instrument(skip(self), fields(entity = E::NAME, policy = ?E::DELETION))]
    async fn soft_delete(&self, id: &str) -> Result<(), RepositoryError> {
        let id = id.to_string();

        self.db
            .with_connection(move |conn| {
                let now = Utc::now();
                let removal = E::DELETION.removal_assignments(now);

                let changed = if E::DELETION.preserves_rows() {
                    update_visible::<E>(conn, &id, removal, now)?
                } else {
                    conn.execute(&format!("DELETE FROM {} WHERE id = ?1", E::TABLE), [&id])?
                };

                if changed == 0 {
                    return Err(RepositoryError::not_found(E::NAME, id));
                }

                debug!("Removed {} {} ({:?})", E::NAME, id, E::DELETION);
                Ok(())
            })
            .await
    }
}

/// `SELECT` the entity's columns with the given equality conditions.
///
/// `visible_only` adds the deletion policy's baseline predicate, which the
/// caller's conditions cannot override.
pub(crate) fn select_where<E: Entity>(
    conn: &Connection,
    conditions: Assignments,
    visible_only: bool,
    order_by: Option<&str>,
) -> Result<Vec<E>, RepositoryError> {
    let mut clauses = Vec::with_capacity(conditions.len() + 1);
    let mut params: Vec<Value> = Vec::with_capacity(conditions.len());

    for (column, value) in conditions {
        params.push(value);
        clauses.push(format!("{} = ?{}", column, params.len()));
    }

    if visible_only {
        if let Some(predicate) = E::DELETION.visibility_predicate() {
            clauses.push(predicate.to_string());
        }
    }

    let mut sql = format!("SELECT {} FROM {}", E::COLUMNS.join(", "), E::TABLE);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(order_by.unwrap_or(E::ORDER_BY));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params), E::from_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

pub(crate) fn select_by_id<E: Entity>(
    conn: &Connection,
    id: &str,
    visible_only: bool,
) -> Result<Option<E>, RepositoryError> {
    let mut sql = format!("SELECT {} FROM {} WHERE id = ?1", E::COLUMNS.join(", "), E::TABLE);
    if visible_only {
        if let Some(predicate) = E::DELETION.visibility_predicate() {
            sql.push_str(" AND ");
            sql.push_str(predicate);
        }
    }

    let record = conn.query_row(&sql, [id], E::from_row).optional()?;
    Ok(record)
}

/// Write `changes` to a visible row, bumping `updated_at` when tracked.
/// Returns the number of rows changed.
pub(crate) fn update_visible<E: Entity>(
    conn: &Connection,
    id: &str,
    changes: Assignments,
    now: DateTime<Utc>,
) -> Result<usize, RepositoryError> {
    let mut sets = Vec::with_capacity(changes.len() + 1);
    let mut params: Vec<Value> = Vec::with_capacity(changes.len() + 2);

    for (column, value) in changes {
        params.push(value);
        sets.push(format!("{} = ?{}", column, params.len()));
    }
    if E::TRACKS_UPDATED_AT {
        params.push(codec::timestamp(now));
        sets.push(format!("updated_at = ?{}", params.len()));
    }

    params.push(codec::text(id));
    let mut sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        E::TABLE,
        sets.join(", "),
        params.len()
    );
    if let Some(predicate) = E::DELETION.visibility_predicate() {
        sql.push_str(" AND ");
        sql.push_str(predicate);
    }

    let changed = conn.execute(&sql, params_from_iter(params))?;
    Ok(changed)
}
