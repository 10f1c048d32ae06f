//! Handlers for role pool administration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use greenlight_core::error::CoreError;
use greenlight_core::roles::RoleKey;
use greenlight_core::types::DbId;
use greenlight_db::models::pool::CreatePool;
use greenlight_db::repositories::{PersonRepo, PoolRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListPoolsQuery {
    /// Restrict to pools serving this role.
    pub role_key: Option<String>,
}

/// GET /api/v1/pools
pub async fn list_pools(
    State(state): State<AppState>,
    Query(query): Query<ListPoolsQuery>,
) -> AppResult<impl IntoResponse> {
    let pools = match query.role_key.as_deref() {
        Some(raw) => {
            let role = RoleKey::from_str_value(raw)
                .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
            PoolRepo::list_for_role(&state.pool, role).await?
        }
        None => PoolRepo::list_all(&state.pool).await?,
    };
    Ok(Json(DataResponse { data: pools }))
}

/// POST /api/v1/pools
pub async fn create_pool(
    State(state): State<AppState>,
    Json(input): Json<CreatePool>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }
    let created = PoolRepo::create(&state.pool, &input).await?;
    tracing::info!(pool_id = created.id, role = %created.role_key, "Pool created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/pools/{id}
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = PoolRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Pool",
            id,
        }))?;
    Ok(Json(DataResponse { data: found }))
}

/// DELETE /api/v1/pools/{id}
///
/// Detaches memberships and seat bindings; never deletes people.
pub async fn delete_pool(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = PoolRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Pool",
            id,
        }));
    }
    tracing::info!(pool_id = id, "Pool deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/pools/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_pool_exists(&state, id).await?;
    let members = PoolRepo::list_members(&state.pool, id).await?;
    Ok(Json(DataResponse { data: members }))
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub person_id: DbId,
}

/// POST /api/v1/pools/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddMemberRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_pool_exists(&state, id).await?;
    if PersonRepo::find_by_id(&state.pool, input.person_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Person",
            id: input.person_id,
        }));
    }
    PoolRepo::add_member(&state.pool, id, input.person_id).await?;
    tracing::info!(pool_id = id, person_id = input.person_id, "Pool member added");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/pools/{id}/members/{person_id}
pub async fn remove_member(
    State(state): State<AppState>,
    Path((id, person_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_pool_exists(&state, id).await?;
    let removed = PoolRepo::remove_member(&state.pool, id, person_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "PoolMember",
            id: person_id,
        }));
    }
    tracing::info!(pool_id = id, person_id, "Pool member removed");
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_pool_exists(state: &AppState, id: DbId) -> AppResult<()> {
    PoolRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Pool",
            id,
        }))?;
    Ok(())
}
