//! Handlers for segments: creation via the workflow facade, listing,
//! detail, seat bindings, and schedule recomputation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use greenlight_core::error::CoreError;
use greenlight_core::types::DbId;
use greenlight_db::models::segment::UpdateSegment;
use greenlight_db::repositories::{SeatRepo, SegmentRepo};

use crate::error::{AppError, AppResult};
use crate::extract::Actor;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow::{self, CreateSegmentRequest, RescheduleRequest};

/// GET /api/v1/segments
pub async fn list_segments(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let segments = SegmentRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: segments }))
}

/// POST /api/v1/segments
///
/// Bootstrap a segment from the step template: schedule, steps, and seat
/// bindings in one transaction. The actor becomes the owner.
pub async fn create_segment(
    actor: Actor,
    State(state): State<AppState>,
    Json(input): Json<CreateSegmentRequest>,
) -> AppResult<impl IntoResponse> {
    let created = workflow::create_segment(&state.pool, &actor, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/segments/{id}
pub async fn get_segment(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = workflow::segment_detail(&state.pool, id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PATCH /api/v1/segments/{id}
pub async fn update_segment(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSegment>,
) -> AppResult<impl IntoResponse> {
    let segment = SegmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Segment",
            id,
        }))?;
    tracing::info!(segment_id = id, "Segment updated");
    Ok(Json(DataResponse { data: segment }))
}

/// DELETE /api/v1/segments/{id}
///
/// Steps, seats, and approvals cascade.
pub async fn delete_segment(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = SegmentRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Segment",
            id,
        }));
    }
    tracing::info!(segment_id = id, "Segment deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/segments/{id}/seats
pub async fn list_seats(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    workflow::load_segment(&state.pool, id).await?;
    let seats = SeatRepo::list_for_segment(&state.pool, id).await?;
    Ok(Json(DataResponse { data: seats }))
}

#[derive(Debug, Deserialize)]
pub struct SetSeatRequest {
    pub role_key: String,
    #[serde(default)]
    pub person_id: Option<DbId>,
    #[serde(default)]
    pub pool_id: Option<DbId>,
}

/// PUT /api/v1/segments/{id}/seats
pub async fn set_seat(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetSeatRequest>,
) -> AppResult<impl IntoResponse> {
    let seat = workflow::set_seat(
        &state.pool,
        id,
        &input.role_key,
        input.person_id,
        input.pool_id,
    )
    .await?;
    Ok(Json(DataResponse { data: seat }))
}

/// POST /api/v1/segments/{id}/schedule
///
/// Re-run the scheduler and rewrite due dates; optionally moves the
/// production anchor first.
pub async fn recompute_schedule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RescheduleRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = workflow::recompute_schedule(&state.pool, id, input).await?;
    Ok(Json(DataResponse { data: outcome }))
}
