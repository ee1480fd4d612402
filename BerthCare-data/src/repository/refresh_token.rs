//! Device-bound refresh token store.
//!
//! Each (user, device) pair holds at most one token row. Issuing a new token
//! for the pair replaces the row in place and clears its revocation state.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, instrument};

use super::errors::RepositoryError;
use crate::database::Database;
use crate::models::codec;
use crate::models::{RefreshToken, UpsertRefreshToken};

const SELECT_SQL: &str = "SELECT id, user_id, device_id, token_hash, issued_at, expires_at,
    revoked_at, replaced_by_jti, last_used_at, created_at, updated_at
FROM refresh_tokens";

#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    db: Database,
}

impl RefreshTokenRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Issue or rotate the token for a user's device
    #[instrument(skip_all)]
    pub async fn upsert_for_device(&self, input: UpsertRefreshToken) -> Result<RefreshToken, RepositoryError> {
        let now = Utc::now();
        let issued_at = input.issued_at.unwrap_or(now);

        self.db
            .with_connection(move |conn| {
                conn.execute(
                    "INSERT INTO refresh_tokens (
                        id, user_id, device_id, token_hash, issued_at, expires_at, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                    ON CONFLICT (user_id, device_id) DO UPDATE SET
                        id = excluded.id,
                        token_hash = excluded.token_hash,
                        issued_at = excluded.issued_at,
                        expires_at = excluded.expires_at,
                        revoked_at = NULL,
                        replaced_by_jti = NULL,
                        last_used_at = NULL,
                        updated_at = excluded.updated_at",
                    params![
                        codec::text(input.jti.as_str()),
                        codec::text(input.user_id.as_str()),
                        codec::text(input.device_id.as_str()),
                        codec::text(input.token_hash.as_str()),
                        codec::timestamp(issued_at),
                        codec::timestamp(input.expires_at),
                        codec::timestamp(now),
                    ],
                )?;
                debug!("Stored refresh token for device");

                conn.query_row(&format!("{SELECT_SQL} WHERE id = ?1"), [&input.jti], token_from_row)
                    .optional()?
                    .ok_or_else(|| RepositoryError::not_found("RefreshToken", input.jti))
            })
            .await
    }

    /// Token with this id in any state
    #[instrument(skip_all)]
    pub async fn find_by_jti(&self, jti: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        let jti = jti.to_string();
        self.db
            .with_connection(move |conn| {
                let token = conn
                    .query_row(&format!("{SELECT_SQL} WHERE id = ?1"), [&jti], token_from_row)
                    .optional()?;
                Ok(token)
            })
            .await
    }

    /// Token with this id that is neither revoked nor expired at `now`
    #[instrument(skip_all)]
    pub async fn find_valid_by_jti(
        &self,
        jti: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RefreshToken>, RepositoryError> {
        let jti = jti.to_string();
        self.db
            .with_connection(move |conn| {
                let token = conn
                    .query_row(
                        &format!("{SELECT_SQL} WHERE id = ?1 AND revoked_at IS NULL AND expires_at > ?2"),
                        params![codec::text(jti), codec::timestamp(now)],
                        token_from_row,
                    )
                    .optional()?;
                Ok(token)
            })
            .await
    }

    /// Mark a token revoked, optionally recording its successor.
    /// Returns whether a token was changed.
    #[instrument(skip_all)]
    pub async fn mark_revoked(
        &self,
        jti: &str,
        revoked_at: DateTime<Utc>,
        replaced_by_jti: Option<String>,
    ) -> Result<bool, RepositoryError> {
        let jti = jti.to_string();
        self.db
            .with_connection(move |conn| {
                let changed = match replaced_by_jti {
                    Some(replacement) => conn.execute(
                        "UPDATE refresh_tokens SET revoked_at = ?1, replaced_by_jti = ?2, updated_at = ?1 WHERE id = ?3",
                        params![codec::timestamp(revoked_at), codec::text(replacement), codec::text(jti)],
                    )?,
                    None => conn.execute(
                        "UPDATE refresh_tokens SET revoked_at = ?1, updated_at = ?1 WHERE id = ?2",
                        params![codec::timestamp(revoked_at), codec::text(jti)],
                    )?,
                };
                Ok(changed > 0)
            })
            .await
    }

    /// Record use of a token. Returns whether a token was changed.
    #[instrument(skip_all)]
    pub async fn touch_last_used(&self, jti: &str, at: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let jti = jti.to_string();
        self.db
            .with_connection(move |conn| {
                let changed = conn.execute(
                    "UPDATE refresh_tokens SET last_used_at = ?1 WHERE id = ?2",
                    params![codec::timestamp(at), codec::text(jti)],
                )?;
                Ok(changed > 0)
            })
            .await
    }

    /// Revoke the token held by one device. Returns the number of tokens changed.
    #[instrument(skip_all)]
    pub async fn revoke_by_device(
        &self,
        user_id: &str,
        device_id: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let user_id = user_id.to_string();
        let device_id = device_id.to_string();
        self.db
            .with_connection(move |conn| {
                let changed = conn.execute(
                    "UPDATE refresh_tokens SET revoked_at = ?1, replaced_by_jti = NULL, updated_at = ?1
                     WHERE user_id = ?2 AND device_id = ?3",
                    params![codec::timestamp(revoked_at), codec::text(user_id), codec::text(device_id)],
                )?;
                Ok(changed)
            })
            .await
    }

    /// Revoke every token a user holds. Returns the number of tokens changed.
    #[instrument(skip_all)]
    pub async fn revoke_all_for_user(
        &self,
        user_id: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let user_id = user_id.to_string();
        self.db
            .with_connection(move |conn| {
                let changed = conn.execute(
                    "UPDATE refresh_tokens SET revoked_at = ?1, replaced_by_jti = NULL, updated_at = ?1
                     WHERE user_id = ?2",
                    params![codec::timestamp(revoked_at), codec::text(user_id)],
                )?;
                Ok(changed)
            })
            .await
    }
}

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<RefreshToken> {
    Ok(RefreshToken {
        id: row.get(0)?,
        user_id: row.get(1)?,
        device_id: row.get(2)?,
        token_hash: row.get(3)?,
        issued_at: row.get(4)?,
        expires_at: row.get(5)?,
        revoked_at: row.get(6)?,
        replaced_by_jti: row.get(7)?,
        last_used_at: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
