use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::entity::{push_eq, Assignments, DeletionPolicy, Entity};
use super::errors::RepositoryError;
use super::sqlite::SqliteRepository;
use crate::models::codec;
use crate::models::{Consent, ConsentFilter, NewConsent, UpdateConsent};

pub type ConsentRepository = SqliteRepository<Consent>;

impl Entity for Consent {
    type Create = NewConsent;
    type Update = UpdateConsent;
    type Filter = ConsentFilter;

    const NAME: &'static str = "Consent";
    const TABLE: &'static str = "consents";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "client_id",
        "caregiver_id",
        "consent_type",
        "granted",
        "granted_at",
        "revoked_at",
        "signature_url",
        "witness_name",
        "deleted_at",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "created_at ASC, id ASC";
    const DELETION: DeletionPolicy = DeletionPolicy::Revoke;
    const TRACKS_UPDATED_AT: bool = true;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Consent {
            id: row.get(0)?,
            client_id: row.get(1)?,
            caregiver_id: row.get(2)?,
            consent_type: row.get(3)?,
            granted: row.get(4)?,
            granted_at: row.get(5)?,
            revoked_at: row.get(6)?,
            signature_url: row.get(7)?,
            witness_name: row.get(8)?,
            deleted_at: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn insert_values(data: NewConsent, now: DateTime<Utc>) -> Result<Assignments, RepositoryError> {
        // A granted consent without an explicit grant time was granted now.
        let granted_at = match (data.granted, data.granted_at) {
            (true, None) => Some(now),
            (_, granted_at) => granted_at,
        };

        Ok(vec![
            ("client_id", codec::text(data.client_id)),
            ("caregiver_id", codec::opt_text(data.caregiver_id)),
            ("consent_type", data.consent_type.into()),
            ("granted", codec::boolean(data.granted)),
            ("granted_at", codec::opt_timestamp(granted_at)),
            ("signature_url", codec::opt_text(data.signature_url)),
            ("witness_name", codec::opt_text(data.witness_name)),
        ])
    }

    fn update_values(data: UpdateConsent) -> Result<Assignments, RepositoryError> {
        let mut values = Assignments::new();
        if let Some(granted) = data.granted {
            values.push(("granted", codec::boolean(granted)));
        }
        if let Some(granted_at) = data.granted_at {
            values.push(("granted_at", codec::opt_timestamp(granted_at)));
        }
        if let Some(revoked_at) = data.revoked_at {
            values.push(("revoked_at", codec::opt_timestamp(revoked_at)));
        }
        if let Some(signature_url) = data.signature_url {
            values.push(("signature_url", codec::opt_text(signature_url)));
        }
        if let Some(witness_name) = data.witness_name {
            values.push(("witness_name", codec::opt_text(witness_name)));
        }
        Ok(values)
    }

    fn filter_conditions(filter: &ConsentFilter) -> Assignments {
        let mut conditions = Assignments::new();
        push_eq(&mut conditions, "client_id", &filter.client_id);
        push_eq(&mut conditions, "caregiver_id", &filter.caregiver_id);
        push_eq(&mut conditions, "consent_type", &filter.consent_type);
        if let Some(granted) = filter.granted {
            conditions.push(("granted", codec::boolean(granted)));
        }
        conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConsentType;
    use crate::repository::testing::{memory_db, seed_people};
    use crate::repository::EntityRepository;

    fn photo_consent(client_id: &str) -> NewConsent {
        NewConsent {
            client_id: client_id.to_string(),
            caregiver_id: None,
            consent_type: ConsentType::PhotoCapture,
            granted: true,
            granted_at: None,
            signature_url: Some("https://files.example.com/sig.png".to_string()),
            witness_name: Some("Sam Rivera".to_string()),
        }
    }

    #[tokio::test]
    async fn test_granted_consent_gets_grant_time() {
        let db = memory_db().await;
        let (_, client) = seed_people(&db).await;
        let repo = ConsentRepository::new(db);

        let consent = repo.create(photo_consent(&client.id)).await.unwrap();
        assert!(consent.granted);
        assert_eq!(consent.granted_at, Some(consent.created_at));
        assert!(consent.revoked_at.is_none());
    }

    #[tokio::test]
    async fn test_revoke_keeps_row_with_revocation_stamps() {
        let db = memory_db().await;
        let (_, client) = seed_people(&db).await;
        let repo = ConsentRepository::new(db);
        let consent = repo.create(photo_consent(&client.id)).await.unwrap();

        repo.soft_delete(&consent.id).await.unwrap();

        assert!(repo.find_by_id(&consent.id).await.unwrap().is_none());
        let granted_filter = ConsentFilter {
            client_id: Some(client.id.clone()),
            granted: Some(false),
            ..Default::default()
        };
        assert!(repo.find_many(granted_filter).await.unwrap().is_empty());

        let revoked = repo
            .find_by_id_including_removed(&consent.id)
            .await
            .unwrap()
            .expect("revoked consent must remain");
        assert!(!revoked.granted);
        assert!(revoked.revoked_at.is_some());
        assert_eq!(revoked.revoked_at, revoked.deleted_at);
    }
}
