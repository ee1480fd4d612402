use chrono::{DateTime, Utc};
use rusqlite::Row;
use tracing::instrument;

use super::entity::{push_eq, Assignments, DeletionPolicy, Entity};
use super::errors::RepositoryError;
use super::sqlite::{select_where, SqliteRepository};
use crate::models::codec;
use crate::models::{Caregiver, CaregiverFilter, NewCaregiver, UpdateCaregiver};

pub type CaregiverRepository = SqliteRepository<Caregiver>;

impl Entity for Caregiver {
    type Create = NewCaregiver;
    type Update = UpdateCaregiver;
    type Filter = CaregiverFilter;

    const NAME: &'static str = "Caregiver";
    const TABLE: &'static str = "caregivers";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "email",
        "name",
        "phone",
        "organization_id",
        "role",
        "is_active",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "name ASC, id ASC";
    const DELETION: DeletionPolicy = DeletionPolicy::Deactivate;
    const TRACKS_UPDATED_AT: bool = true;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Caregiver {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            phone: row.get(3)?,
            organization_id: row.get(4)?,
            role: row.get(5)?,
            is_active: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn insert_values(data: NewCaregiver, _now: DateTime<Utc>) -> Result<Assignments, RepositoryError> {
        Ok(vec![
            ("email", codec::text(data.email)),
            ("name", codec::text(data.name)),
            ("phone", codec::text(data.phone)),
            ("organization_id", codec::text(data.organization_id)),
            ("role", data.role.into()),
        ])
    }

    fn update_values(data: UpdateCaregiver) -> Result<Assignments, RepositoryError> {
        let mut values = Assignments::new();
        if let Some(email) = data.email {
            values.push(("email", codec::text(email)));
        }
        if let Some(name) = data.name {
            values.push(("name", codec::text(name)));
        }
        if let Some(phone) = data.phone {
            values.push(("phone", codec::text(phone)));
        }
        if let Some(organization_id) = data.organization_id {
            values.push(("organization_id", codec::text(organization_id)));
        }
        if let Some(role) = data.role {
            values.push(("role", role.into()));
        }
        Ok(values)
    }

    fn filter_conditions(filter: &CaregiverFilter) -> Assignments {
        let mut conditions = Assignments::new();
        push_eq(&mut conditions, "email", &filter.email);
        push_eq(&mut conditions, "organization_id", &filter.organization_id);
        push_eq(&mut conditions, "role", &filter.role);
        conditions
    }
}

impl SqliteRepository<Caregiver> {
    /// Active caregiver with the given email address
    #[instrument(skip(self, email))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Caregiver>, RepositoryError> {
        let conditions = vec![("email", codec::text(email))];
        self.database()
            .with_connection(move |conn| {
                Ok(select_where::<Caregiver>(conn, conditions, true, None)?
                    .into_iter()
                    .next())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CaregiverRole;
    use crate::repository::testing::{memory_db, new_caregiver};
    use crate::repository::EntityRepository;

    #[tokio::test]
    async fn test_create_and_find_caregiver() {
        let repo = CaregiverRepository::new(memory_db().await);
        let created = repo.create(new_caregiver("ada@example.com")).await.unwrap();

        assert!(created.is_active);
        assert_eq!(created.role, CaregiverRole::Caregiver);
        assert_eq!(created.created_at, created.updated_at);

        let found = repo.find_by_id(&created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_constraint_violation() {
        let repo = CaregiverRepository::new(memory_db().await);
        repo.create(new_caregiver("dup@example.com")).await.unwrap();

        let err = repo.create(new_caregiver("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_deactivated_caregiver_is_hidden_but_kept() {
        let repo = CaregiverRepository::new(memory_db().await);
        let created = repo.create(new_caregiver("gone@example.com")).await.unwrap();

        repo.soft_delete(&created.id).await.unwrap();

        assert!(repo.find_by_id(&created.id).await.unwrap().is_none());
        assert!(repo.find_by_email("gone@example.com").await.unwrap().is_none());

        let kept = repo
            .find_by_id_including_removed(&created.id)
            .await
            .unwrap()
            .expect("row must still exist");
        assert!(!kept.is_active);
        assert!(kept.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_filter_by_role() {
        let repo = CaregiverRepository::new(memory_db().await);
        repo.create(new_caregiver("a@example.com")).await.unwrap();
        let mut coordinator = new_caregiver("b@example.com");
        coordinator.role = CaregiverRole::Coordinator;
        let coordinator = repo.create(coordinator).await.unwrap();

        let found = repo
            .find_many(CaregiverFilter {
                role: Some(CaregiverRole::Coordinator),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, coordinator.id);
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let repo = CaregiverRepository::new(memory_db().await);
        let created = repo.create(new_caregiver("c@example.com")).await.unwrap();

        let updated = repo
            .update(
                &created.id,
                UpdateCaregiver {
                    name: Some("Grace Hopper".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Grace Hopper");
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.phone, created.phone);
        assert!(updated.updated_at >= created.updated_at);
    }
}
