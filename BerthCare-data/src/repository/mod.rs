//! Repository layer over the SQLite data client
//!
//! Every entity is served by one generic [`SqliteRepository`] parameterized by
//! the entity's storage description ([`Entity`]). Entity specific lookups are
//! inherent methods on the concrete repository alias.

pub mod errors;
mod entity;
mod sqlite;

mod alert;
mod audit_log;
mod caregiver;
mod client;
mod consent;
mod photo;
mod refresh_token;
mod schedule;
mod visit;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use entity::{Assignments, DeletionPolicy, Entity};
pub use errors::RepositoryError;
pub use sqlite::{EntityRepository, SqliteRepository};

pub use alert::AlertRepository;
pub use audit_log::AuditLogRepository;
pub use caregiver::CaregiverRepository;
pub use client::ClientRepository;
pub use consent::ConsentRepository;
pub use photo::PhotoRepository;
pub use refresh_token::RefreshTokenRepository;
pub use schedule::ScheduleRepository;
pub use visit::{merge_objects, VisitRepository};

use crate::database::Database;

/// One repository per entity, all sharing the same injected [`Database`]
#[derive(Debug, Clone)]
pub struct Repositories {
    pub caregivers: CaregiverRepository,
    pub clients: ClientRepository,
    pub schedules: ScheduleRepository,
    pub visits: VisitRepository,
    pub photos: PhotoRepository,
    pub alerts: AlertRepository,
    pub consents: ConsentRepository,
    pub audit_logs: AuditLogRepository,
    pub refresh_tokens: RefreshTokenRepository,
}

impl Repositories {
    pub fn new(db: &Database) -> Self {
        Self {
            caregivers: CaregiverRepository::new(db.clone()),
            clients: ClientRepository::new(db.clone()),
            schedules: ScheduleRepository::new(db.clone()),
            visits: VisitRepository::new(db.clone()),
            photos: PhotoRepository::new(db.clone()),
            alerts: AlertRepository::new(db.clone()),
            consents: ConsentRepository::new(db.clone()),
            audit_logs: AuditLogRepository::new(db.clone()),
            refresh_tokens: RefreshTokenRepository::new(db.clone()),
        }
    }
}
