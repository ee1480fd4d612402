use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::entity::{push_eq, Assignments, DeletionPolicy, Entity};
use super::errors::RepositoryError;
use super::sqlite::SqliteRepository;
use crate::models::codec;
use crate::models::{Client, ClientFilter, NewClient, UpdateClient};

pub type ClientRepository = SqliteRepository<Client>;

impl Entity for Client {
    type Create = NewClient;
    type Update = UpdateClient;
    type Filter = ClientFilter;

    const NAME: &'static str = "Client";
    const TABLE: &'static str = "clients";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "photo_url",
        "address",
        "phone",
        "emergency_contact",
        "organization_id",
        "is_active",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "name ASC, id ASC";
    const DELETION: DeletionPolicy = DeletionPolicy::Deactivate;
    const TRACKS_UPDATED_AT: bool = true;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Client {
            id: row.get(0)?,
            name: row.get(1)?,
            photo_url: row.get(2)?,
            address: row.get(3)?,
            phone: row.get(4)?,
            emergency_contact: row.get(5)?,
            organization_id: row.get(6)?,
            is_active: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn insert_values(data: NewClient, _now: DateTime<Utc>) -> Result<Assignments, RepositoryError> {
        Ok(vec![
            ("name", codec::text(data.name)),
            ("photo_url", codec::opt_text(data.photo_url)),
            ("address", codec::text(data.address)),
            ("phone", codec::opt_text(data.phone)),
            ("emergency_contact", codec::opt_text(data.emergency_contact)),
            ("organization_id", codec::text(data.organization_id)),
        ])
    }

    fn update_values(data: UpdateClient) -> Result<Assignments, RepositoryError> {
        let mut values = Assignments::new();
        if let Some(name) = data.name {
            values.push(("name", codec::text(name)));
        }
        if let Some(photo_url) = data.photo_url {
            values.push(("photo_url", codec::opt_text(photo_url)));
        }
        if let Some(address) = data.address {
            values.push(("address", codec::text(address)));
        }
        if let Some(phone) = data.phone {
            values.push(("phone", codec::opt_text(phone)));
        }
        if let Some(emergency_contact) = data.emergency_contact {
            values.push(("emergency_contact", codec::opt_text(emergency_contact)));
        }
        if let Some(organization_id) = data.organization_id {
            values.push(("organization_id", codec::text(organization_id)));
        }
        Ok(values)
    }

    fn filter_conditions(filter: &ClientFilter) -> Assignments {
        let mut conditions = Assignments::new();
        push_eq(&mut conditions, "organization_id", &filter.organization_id);
        push_eq(&mut conditions, "name", &filter.name);
        conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{memory_db, new_client};
    use crate::repository::EntityRepository;

    #[tokio::test]
    async fn test_soft_deleted_client_is_excluded_for_every_filter() {
        let repo = ClientRepository::new(memory_db().await);
        let kept = repo.create(new_client("Kept", "org-1")).await.unwrap();
        let removed = repo.create(new_client("Removed", "org-1")).await.unwrap();
        repo.soft_delete(&removed.id).await.unwrap();

        let filters = [
            ClientFilter::default(),
            ClientFilter {
                organization_id: Some("org-1".to_string()),
                ..Default::default()
            },
            ClientFilter {
                name: Some("Removed".to_string()),
                ..Default::default()
            },
            ClientFilter {
                organization_id: Some("org-1".to_string()),
                name: Some("Removed".to_string()),
            },
        ];

        for filter in filters {
            let found = repo.find_many(filter.clone()).await.unwrap();
            assert!(
                found.iter().all(|c| c.id != removed.id),
                "removed client leaked through {filter:?}"
            );
        }

        let all = repo.find_many(ClientFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, kept.id);
    }

    #[tokio::test]
    async fn test_update_clears_nullable_field_with_explicit_null() {
        let repo = ClientRepository::new(memory_db().await);
        let created = repo.create(new_client("Margaret", "org-1")).await.unwrap();
        assert!(created.phone.is_some());

        let patch: UpdateClient = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        let updated = repo.update(&created.id, patch).await.unwrap();

        assert_eq!(updated.phone, None);
        assert_eq!(updated.emergency_contact, created.emergency_contact);
    }

    #[tokio::test]
    async fn test_update_missing_client_is_not_found() {
        let repo = ClientRepository::new(memory_db().await);
        let err = repo
            .update(
                "does-not-exist",
                UpdateClient {
                    name: Some("Nobody".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_empty_update_returns_current_record() {
        let repo = ClientRepository::new(memory_db().await);
        let created = repo.create(new_client("Unchanged", "org-2")).await.unwrap();

        let same = repo.update(&created.id, UpdateClient::default()).await.unwrap();
        assert_eq!(same, created);
    }

    #[tokio::test]
    async fn test_soft_delete_twice_is_not_found() {
        let repo = ClientRepository::new(memory_db().await);
        let created = repo.create(new_client("Twice", "org-3")).await.unwrap();

        repo.soft_delete(&created.id).await.unwrap();
        let err = repo.soft_delete(&created.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
