//! Handlers for the person directory.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use greenlight_core::error::CoreError;
use greenlight_core::types::DbId;
use greenlight_db::models::person::{CreatePerson, UpdatePerson};
use greenlight_db::repositories::PersonRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/people
pub async fn list_people(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let people = PersonRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: people }))
}

/// POST /api/v1/people
pub async fn create_person(
    State(state): State<AppState>,
    Json(input): Json<CreatePerson>,
) -> AppResult<impl IntoResponse> {
    if input.display_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "display_name must not be empty".into(),
        )));
    }
    if input.email.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "email must not be empty".into(),
        )));
    }
    let person = PersonRepo::create(&state.pool, &input).await?;
    tracing::info!(person_id = person.id, "Person created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: person })))
}

/// GET /api/v1/people/{id}
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let person = PersonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Person",
            id,
        }))?;
    Ok(Json(DataResponse { data: person }))
}

/// PATCH /api/v1/people/{id}
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePerson>,
) -> AppResult<impl IntoResponse> {
    let person = PersonRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Person",
            id,
        }))?;
    tracing::info!(person_id = id, "Person updated");
    Ok(Json(DataResponse { data: person }))
}

/// DELETE /api/v1/people/{id}
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = PersonRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Person",
            id,
        }));
    }
    tracing::info!(person_id = id, "Person deleted");
    Ok(StatusCode::NO_CONTENT)
}
