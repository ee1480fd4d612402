//! Storage description of a repository-managed entity.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;

use super::errors::RepositoryError;
use crate::models::codec;

/// Column/value pairs written by an insert or update
pub type Assignments = Vec<(&'static str, Value)>;

/// How `soft_delete` removes a record of a given entity.
///
/// Every policy except [`DeletionPolicy::Purge`] keeps the row and hides it
/// from default reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Delete the row.
    Purge,
    /// Stamp `deleted_at`.
    Tombstone,
    /// Clear `granted`, stamp `revoked_at` and `deleted_at`.
    Revoke,
    /// Clear `is_active`.
    Deactivate,
}

impl DeletionPolicy {
    /// Baseline predicate AND-ed into every default read
    pub const fn visibility_predicate(&self) -> Option<&'static str> {
        match self {
            DeletionPolicy::Purge => None,
            DeletionPolicy::Tombstone | DeletionPolicy::Revoke => Some("deleted_at IS NULL"),
            DeletionPolicy::Deactivate => Some("is_active = 1"),
        }
    }

    /// Columns written when a record is soft deleted at `now`.
    ///
    /// Empty for [`DeletionPolicy::Purge`].
    pub fn removal_assignments(&self, now: DateTime<Utc>) -> Assignments {
        match self {
            DeletionPolicy::Purge => Vec::new(),
            DeletionPolicy::Tombstone => vec![("deleted_at", codec::timestamp(now))],
            DeletionPolicy::Revoke => vec![
                ("granted", codec::boolean(false)),
                ("revoked_at", codec::timestamp(now)),
                ("deleted_at", codec::timestamp(now)),
            ],
            DeletionPolicy::Deactivate => vec![("is_active", codec::boolean(false))],
        }
    }

    /// Whether removed rows stay in the table
    pub const fn preserves_rows(&self) -> bool {
        !matches!(self, DeletionPolicy::Purge)
    }
}

/// An entity stored in one table and served by the generic repository.
///
/// `COLUMNS` lists the selected columns in the order `from_row` reads them.
/// The repository owns `id`, `created_at` and `updated_at`; implementations
/// never emit them from `insert_values` or `update_values`.
pub trait Entity: Send + Sync + Sized + 'static {
    type Create: Send + 'static;
    type Update: Send + 'static;
    type Filter: Default + Send + 'static;

    /// Name used in errors and logs
    const NAME: &'static str;
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str;
    const DELETION: DeletionPolicy;
    /// Whether the table has an `updated_at` column
    const TRACKS_UPDATED_AT: bool;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn insert_values(data: Self::Create, now: DateTime<Utc>) -> Result<Assignments, RepositoryError>;

    fn update_values(data: Self::Update) -> Result<Assignments, RepositoryError>;

    /// Equality conditions for the caller's filter
    fn filter_conditions(filter: &Self::Filter) -> Assignments;
}

/// Push `column = value` when a filter field is set
pub(crate) fn push_eq<T: Clone + Into<Value>>(
    conditions: &mut Assignments,
    column: &'static str,
    value: &Option<T>,
) {
    if let Some(value) = value {
        conditions.push((column, value.clone().into()));
    }
}
