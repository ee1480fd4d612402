//! Fixtures shared by repository tests.

use uuid::Uuid;

use super::{CaregiverRepository, ClientRepository, EntityRepository, ScheduleRepository, VisitRepository};
use crate::database::Database;
use crate::models::{
    Caregiver, CaregiverRole, Client, NewCaregiver, NewClient, NewPhoto, NewSchedule, NewVisit, Schedule,
    Visit,
};

/// Migrated in-memory database
pub async fn memory_db() -> Database {
    let db = Database::open_in_memory().expect("open in-memory database");
    db.migrate().await.expect("apply migrations");
    db
}

pub fn new_caregiver(email: &str) -> NewCaregiver {
    NewCaregiver {
        email: email.to_string(),
        name: "Ada Lovelace".to_string(),
        phone: "+1-604-555-0100".to_string(),
        organization_id: "org-1".to_string(),
        role: CaregiverRole::Caregiver,
    }
}

pub fn new_client(name: &str, organization_id: &str) -> NewClient {
    NewClient {
        name: name.to_string(),
        photo_url: None,
        address: "12 Harbour Lane".to_string(),
        phone: Some("+1-604-555-0199".to_string()),
        emergency_contact: Some("Daughter: +1-604-555-0142".to_string()),
        organization_id: organization_id.to_string(),
    }
}

pub fn new_schedule(caregiver_id: &str, client_id: &str, date: &str, time: &str) -> NewSchedule {
    NewSchedule {
        caregiver_id: caregiver_id.to_string(),
        client_id: client_id.to_string(),
        scheduled_date: date.parse().expect("valid date"),
        scheduled_time: format!("{time}:00").parse().expect("valid time"),
        duration_minutes: 60,
        status: None,
    }
}

pub fn new_visit(schedule: &Schedule, date: &str) -> NewVisit {
    NewVisit {
        schedule_id: schedule.id.clone(),
        caregiver_id: schedule.caregiver_id.clone(),
        client_id: schedule.client_id.clone(),
        visit_date: date.parse().expect("valid date"),
        start_time: None,
        end_time: None,
        documentation: None,
        photo_ids: Vec::new(),
        location: None,
        changed_fields: Vec::new(),
        copied_from_visit_id: None,
        sync_status: None,
    }
}

pub fn new_photo(visit: &Visit) -> NewPhoto {
    NewPhoto {
        visit_id: visit.id.clone(),
        client_id: visit.client_id.clone(),
        caregiver_id: visit.caregiver_id.clone(),
        local_path: Some("/data/photos/wound.jpg".to_string()),
        s3_key: None,
        mime_type: "image/jpeg".to_string(),
        size_bytes: 2_048_000,
        compressed_size_bytes: 512_000,
        width: 1920,
        height: 1080,
        sync_status: None,
    }
}

/// A caregiver and a client with unique identifiers
pub async fn seed_people(db: &Database) -> (Caregiver, Client) {
    let caregiver = CaregiverRepository::new(db.clone())
        .create(new_caregiver(&format!("{}@example.com", Uuid::new_v4())))
        .await
        .expect("create caregiver");
    let client = ClientRepository::new(db.clone())
        .create(new_client("Margaret Chen", &caregiver.organization_id))
        .await
        .expect("create client");
    (caregiver, client)
}

/// A visit with its caregiver, client and schedule
pub async fn seed_visit(db: &Database) -> Visit {
    let (caregiver, client) = seed_people(db).await;
    let schedule = ScheduleRepository::new(db.clone())
        .create(new_schedule(&caregiver.id, &client.id, "2024-06-01", "09:00"))
        .await
        .expect("create schedule");
    VisitRepository::new(db.clone())
        .create(new_visit(&schedule, "2024-06-01"))
        .await
        .expect("create visit")
}
