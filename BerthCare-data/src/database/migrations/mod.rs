//! SQLite schema migrations.
//!
//! Migrations are registered in strictly increasing order and the applied
//! version is mirrored to `PRAGMA user_version`. Pending migrations run in a
//! single transaction.

use rusqlite::Connection;
use tracing::info;

use super::DatabaseError;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "care_records",
        sql: include_str!("0001_care_records.sql"),
    },
    Migration {
        version: 2,
        name: "refresh_tokens",
        sql: include_str!("0002_refresh_tokens.sql"),
    },
];

/// Latest schema version known by this build
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Schema version recorded in the database file
pub fn current_version(conn: &Connection) -> Result<u32, DatabaseError> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Apply all pending migrations on the provided connection
pub fn apply_migrations(conn: &mut Connection) -> Result<(), DatabaseError> {
    let current = current_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DatabaseError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    if current == latest {
        info!("Database schema is up to date (version {})", current);
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!("Applying migration {:04} {}", migration.version, migration.name);
        tx.execute_batch(migration.sql).map_err(|e| {
            DatabaseError::Migration(format!("{:04} {}: {}", migration.version, migration.name, e))
        })?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    info!("Database migrations completed (version {} -> {})", current, latest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_apply_migrations_creates_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        assert_eq!(current_version(&conn).unwrap(), latest_version());

        let tables = table_names(&conn);
        for expected in [
            "alerts",
            "audit_logs",
            "caregivers",
            "clients",
            "consents",
            "photos",
            "refresh_tokens",
            "schedules",
            "visits",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
    }

    #[test]
    fn test_apply_migrations_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();

        assert_eq!(current_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn test_required_indexes_exist() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'index'")
            .unwrap();
        let indexes: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for expected in [
            "idx_caregivers_email",
            "idx_schedules_caregiver_date",
            "idx_visits_client_date",
            "idx_audit_logs_entity",
        ] {
            assert!(indexes.iter().any(|i| i == expected), "missing index {expected}");
        }
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
            .unwrap();

        let err = apply_migrations(&mut conn).unwrap_err();
        assert!(matches!(err, DatabaseError::UnsupportedSchemaVersion { .. }));
    }
}
