use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::entity::{push_eq, Assignments, DeletionPolicy, Entity};
use super::errors::RepositoryError;
use super::sqlite::SqliteRepository;
use crate::models::codec;
use crate::models::{NewPhoto, Photo, PhotoFilter, PhotoSyncStatus, UpdatePhoto};

pub type PhotoRepository = SqliteRepository<Photo>;

impl Entity for Photo {
    type Create = NewPhoto;
    type Update = UpdatePhoto;
    type Filter = PhotoFilter;

    const NAME: &'static str = "Photo";
    const TABLE: &'static str = "photos";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "visit_id",
        "client_id",
        "caregiver_id",
        "local_path",
        "s3_key",
        "mime_type",
        "size_bytes",
        "compressed_size_bytes",
        "width",
        "height",
        "sync_status",
        "uploaded_at",
        "deleted_at",
        "created_at",
    ];
    const ORDER_BY: &'static str = "created_at ASC, id ASC";
    const DELETION: DeletionPolicy = DeletionPolicy::Tombstone;
    const TRACKS_UPDATED_AT: bool = false;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Photo {
            id: row.get(0)?,
            visit_id: row.get(1)?,
            client_id: row.get(2)?,
            caregiver_id: row.get(3)?,
            local_path: row.get(4)?,
            s3_key: row.get(5)?,
            mime_type: row.get(6)?,
            size_bytes: row.get(7)?,
            compressed_size_bytes: row.get(8)?,
            width: row.get(9)?,
            height: row.get(10)?,
            sync_status: row.get(11)?,
            uploaded_at: row.get(12)?,
            deleted_at: row.get(13)?,
            created_at: row.get(14)?,
        })
    }

    fn insert_values(data: NewPhoto, _now: DateTime<Utc>) -> Result<Assignments, RepositoryError> {
        Ok(vec![
            ("visit_id", codec::text(data.visit_id)),
            ("client_id", codec::text(data.client_id)),
            ("caregiver_id", codec::text(data.caregiver_id)),
            ("local_path", codec::opt_text(data.local_path)),
            ("s3_key", codec::opt_text(data.s3_key)),
            ("mime_type", codec::text(data.mime_type)),
            ("size_bytes", codec::integer(data.size_bytes)),
            ("compressed_size_bytes", codec::integer(data.compressed_size_bytes)),
            ("width", codec::integer(data.width)),
            ("height", codec::integer(data.height)),
            ("sync_status", data.sync_status.unwrap_or(PhotoSyncStatus::Local).into()),
        ])
    }

    fn update_values(data: UpdatePhoto) -> Result<Assignments, RepositoryError> {
        let mut values = Assignments::new();
        if let Some(local_path) = data.local_path {
            values.push(("local_path", codec::opt_text(local_path)));
        }
        if let Some(s3_key) = data.s3_key {
            values.push(("s3_key", codec::opt_text(s3_key)));
        }
        if let Some(size) = data.compressed_size_bytes {
            values.push(("compressed_size_bytes", codec::integer(size)));
        }
        if let Some(sync_status) = data.sync_status {
            values.push(("sync_status", sync_status.into()));
        }
        if let Some(uploaded_at) = data.uploaded_at {
            values.push(("uploaded_at", codec::opt_timestamp(uploaded_at)));
        }
        Ok(values)
    }

    fn filter_conditions(filter: &PhotoFilter) -> Assignments {
        let mut conditions = Assignments::new();
        push_eq(&mut conditions, "visit_id", &filter.visit_id);
        push_eq(&mut conditions, "client_id", &filter.client_id);
        push_eq(&mut conditions, "caregiver_id", &filter.caregiver_id);
        push_eq(&mut conditions, "sync_status", &filter.sync_status);
        conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{memory_db, new_photo, seed_visit};
    use crate::repository::EntityRepository;

    #[tokio::test]
    async fn test_photo_upload_lifecycle() {
        let db = memory_db().await;
        let visit = seed_visit(&db).await;
        let repo = PhotoRepository::new(db);

        let photo = repo.create(new_photo(&visit)).await.unwrap();
        assert_eq!(photo.sync_status, PhotoSyncStatus::Local);
        assert!(photo.s3_key.is_none());

        let uploaded = repo
            .update(
                &photo.id,
                UpdatePhoto {
                    s3_key: Some(Some("photos/abc.jpg".to_string())),
                    local_path: Some(None),
                    sync_status: Some(PhotoSyncStatus::Synced),
                    uploaded_at: Some(Some(Utc::now())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(uploaded.s3_key.as_deref(), Some("photos/abc.jpg"));
        assert!(uploaded.local_path.is_none());
        assert!(uploaded.uploaded_at.is_some());
    }

    #[tokio::test]
    async fn test_tombstoned_photo_is_excluded_from_visit_listing() {
        let db = memory_db().await;
        let visit = seed_visit(&db).await;
        let repo = PhotoRepository::new(db);

        let kept = repo.create(new_photo(&visit)).await.unwrap();
        let removed = repo.create(new_photo(&visit)).await.unwrap();
        repo.soft_delete(&removed.id).await.unwrap();

        let listed = repo
            .find_many(PhotoFilter {
                visit_id: Some(visit.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, kept.id);
        assert!(repo
            .find_by_id_including_removed(&removed.id)
            .await
            .unwrap()
            .is_some());
    }
}
