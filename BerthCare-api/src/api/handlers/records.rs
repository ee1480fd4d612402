//! Create, read, update and delete endpoints shared by every care record type.
//!
//! Each handler is generic over a [`Resource`]; the router instantiates it
//! once per entity.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use berthcare_data::models::{AuditLog, Alert, Caregiver, Client, Consent, Photo, Schedule, Visit};
use berthcare_data::repository::{Entity, SqliteRepository};
use berthcare_data::{EntityRepository, Repositories};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::api::error::{resource_label, ErrorResponse};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// An entity exposed as a REST collection
pub trait Resource: Entity + Serialize {
    /// Collection path segment under `/api/v1`
    const PATH: &'static str;

    fn repository(repositories: &Repositories) -> &SqliteRepository<Self>;
}

macro_rules! resource {
    ($entity:ty, $path:literal, $field:ident) => {
        impl Resource for $entity {
            const PATH: &'static str = $path;

            fn repository(repositories: &Repositories) -> &SqliteRepository<Self> {
                &repositories.$field
            }
        }
    };
}

resource!(Caregiver, "caregivers", caregivers);
resource!(Client, "clients", clients);
resource!(Schedule, "schedules", schedules);
resource!(Visit, "visits", visits);
resource!(Photo, "photos", photos);
resource!(Alert, "alerts", alerts);
resource!(Consent, "consents", consents);
resource!(AuditLog, "audit-logs", audit_logs);

/// List visible records matching the query-string filter
#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn list<E>(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<E::Filter>,
) -> Result<Json<Vec<E>>, ErrorResponse>
where
    E: Resource,
    E::Filter: DeserializeOwned,
{
    let records = E::repository(&state.repositories).find_many(filter).await?;
    debug!("Found {} records", records.len());
    Ok(Json(records))
}

#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn create<E>(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<E::Create>,
) -> Result<impl IntoResponse, ErrorResponse>
where
    E: Resource,
    E::Create: DeserializeOwned + Validate,
{
    payload.validate()?;

    let record = E::repository(&state.repositories).create(payload).await?;
    info!("Created {}", E::NAME);
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state), fields(entity = E::NAME))]
pub async fn get<E: Resource>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<E>, ErrorResponse> {
    E::repository(&state.repositories)
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found(&resource_label(E::NAME)))
}

#[instrument(skip(state, changes), fields(entity = E::NAME))]
pub async fn update<E>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(changes): ApiJson<E::Update>,
) -> Result<Json<E>, ErrorResponse>
where
    E: Resource,
    E::Update: DeserializeOwned + Validate,
{
    changes.validate()?;

    let record = E::repository(&state.repositories).update(&id, changes).await?;
    Ok(Json(record))
}

/// Remove a record according to its deletion policy
#[instrument(skip(state), fields(entity = E::NAME, policy = ?E::DELETION))]
pub async fn remove<E: Resource>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, ErrorResponse> {
    E::repository(&state.repositories).soft_delete(&id).await?;
    info!("Removed {}", E::NAME);
    Ok(StatusCode::NO_CONTENT)
}
