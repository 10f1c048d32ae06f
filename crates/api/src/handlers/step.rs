//! Handlers for steps: read model, edits, gate decisions, lifecycle
//! actions, approval history, and the pending-approvals view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use greenlight_core::error::CoreError;
use greenlight_core::types::{DbId, DueDate};
use greenlight_db::models::step::UpdateStep;
use greenlight_db::repositories::{ApprovalRepo, StepRepo};

use crate::error::{AppError, AppResult};
use crate::extract::Actor;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow::{self, DecisionRequest, StepAction};

/// GET /api/v1/steps/{id}
///
/// The step with its effective status, progress, and latest decision per
/// role.
pub async fn get_step(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = workflow::step_detail(&state.pool, id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// Request body for step edits. Nested options distinguish omitted fields
/// from explicit nulls; an explicit null clears the column.
#[derive(Debug, Deserialize)]
pub struct UpdateStepRequest {
    #[serde(default, with = "double_option")]
    pub due_date: Option<Option<DueDate>>,
    #[serde(default, with = "double_option")]
    pub assignee_id: Option<Option<DbId>>,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

/// PATCH /api/v1/steps/{id}
pub async fn update_step(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStepRequest>,
) -> AppResult<impl IntoResponse> {
    let update = UpdateStep {
        due_date: input.due_date,
        status: None,
        assignee_id: input.assignee_id,
    };
    let step = StepRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Step",
            id,
        }))?;
    tracing::info!(step_id = id, "Step updated");
    Ok(Json(DataResponse { data: step }))
}

/// POST /api/v1/steps/{id}/decide
///
/// Record a gate decision as the actor. The engine selects which required
/// role the actor acts for.
pub async fn decide(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = workflow::record_decision(
        &state.pool,
        state.config.gate_lock_mode,
        &actor,
        id,
        input,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

#[derive(Debug, Deserialize)]
pub struct StepActionRequest {
    pub action: StepAction,
}

/// POST /api/v1/steps/{id}/actions
pub async fn apply_action(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<StepActionRequest>,
) -> AppResult<impl IntoResponse> {
    let summary = workflow::apply_step_action(&state.pool, &actor, id, input.action).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/steps/{id}/approvals
///
/// Full decision history for the step, newest first.
pub async fn approval_history(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    workflow::load_step(&state.pool, id).await?;
    let history = ApprovalRepo::history_for_step(&state.pool, id).await?;
    Ok(Json(DataResponse { data: history }))
}

/// GET /api/v1/approvals/pending
///
/// Gate steps the actor can still decide for.
pub async fn pending_approvals(
    actor: Actor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pending = workflow::pending_approvals(&state.pool, &actor).await?;
    Ok(Json(DataResponse { data: pending }))
}
