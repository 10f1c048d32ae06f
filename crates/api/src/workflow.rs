//! Segment workflow facade.
//!
//! The handlers stay thin; the multi-step orchestration lives here:
//! bootstrapping a segment from the step template, recording gate
//! decisions, lifecycle actions, schedule recomputation, and the
//! pending-approvals query.

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::PgPool;

use greenlight_core::approval::Decision;
use greenlight_core::error::CoreError;
use greenlight_core::gate::{
    self, ApprovalProgress, GateLockMode, RoleDecision,
};
use greenlight_core::roles::RoleKey;
use greenlight_core::seats::{eligibility_with_override, EligibilityBasis, SeatBinding};
use greenlight_core::status::StepStatus;
use greenlight_core::timeline::{self, Phase, StepOverride, StepTemplate};
use greenlight_core::types::{DbId, DueDate};

use greenlight_db::models::approval::{Approval, RecordApproval};
use greenlight_db::models::seat::SegmentSeat;
use greenlight_db::models::segment::{CreateSegment, Segment};
use greenlight_db::models::step::{CreateStep, Step};
use greenlight_db::repositories::{
    ApprovalRepo, PersonRepo, PoolRepo, SeatRepo, SegmentRepo, StepRepo,
};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::Actor;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One seat binding in a segment creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct SeatAssignment {
    pub role_key: String,
    #[serde(default)]
    pub person_id: Option<DbId>,
    #[serde(default)]
    pub pool_id: Option<DbId>,
}

/// Request body for creating a segment.
#[derive(Debug, Deserialize)]
pub struct CreateSegmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub production_date: DueDate,
    #[serde(default)]
    pub needs_publish: bool,
    #[serde(default)]
    pub seats: Vec<SeatAssignment>,
    #[serde(default)]
    pub overrides: BTreeMap<String, StepOverride>,
}

/// A created segment with its steps and any scheduling warnings.
#[derive(Debug, Serialize)]
pub struct CreatedSegment {
    pub segment: Segment,
    pub steps: Vec<Step>,
    pub warnings: Vec<String>,
}

/// Full segment read model: segment, ordered steps, seat map.
#[derive(Debug, Serialize)]
pub struct SegmentDetail {
    pub segment: Segment,
    pub steps: Vec<StepSummary>,
    pub seats: Vec<SegmentSeat>,
}

/// A step with its effective status and approval progress.
#[derive(Debug, Serialize)]
pub struct StepSummary {
    #[serde(flatten)]
    pub step: Step,
    pub effective_status: StepStatus,
    pub progress: ApprovalProgress,
}

/// Step detail: the summary plus the latest decision per role.
#[derive(Debug, Serialize)]
pub struct StepDetail {
    #[serde(flatten)]
    pub summary: StepSummary,
    pub latest_decisions: Vec<Approval>,
}

/// Request body for recording a gate decision.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
    /// Which required role to decide for, when the actor holds several.
    #[serde(default)]
    pub role_key: Option<RoleKey>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Outcome of a recorded decision.
#[derive(Debug, Serialize)]
pub struct DecisionOutcome {
    pub approval: Approval,
    pub role_key: RoleKey,
    pub basis: EligibilityBasis,
    pub effective_status: StepStatus,
    pub progress: ApprovalProgress,
}

/// Explicit lifecycle actions on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Start,
    SendForApprovals,
    RequestChanges,
    MarkComplete,
    Reopen,
    Reset,
}

/// Request body for recomputing a segment's schedule.
#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    #[serde(default)]
    pub production_date: Option<DueDate>,
    #[serde(default)]
    pub overrides: BTreeMap<String, StepOverride>,
}

/// Recomputed schedule: the rewritten steps plus warnings.
#[derive(Debug, Serialize)]
pub struct RescheduleOutcome {
    pub steps: Vec<Step>,
    pub warnings: Vec<String>,
}

/// One entry of the pending-approvals view.
#[derive(Debug, Serialize)]
pub struct PendingApproval {
    pub segment_id: DbId,
    pub segment_title: String,
    pub step_id: DbId,
    pub step_name: String,
    pub due_date: Option<DueDate>,
    /// Roles on this step the actor may still decide for.
    pub roles: Vec<RoleKey>,
    pub basis: EligibilityBasis,
    pub progress: ApprovalProgress,
}

// ---------------------------------------------------------------------------
// Loading helpers
// ---------------------------------------------------------------------------

/// Load a segment or map its absence to `NotFound`.
pub async fn load_segment(pool: &PgPool, id: DbId) -> AppResult<Segment> {
    SegmentRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Segment",
            id,
        }))
}

/// Load a step or map its absence to `NotFound`.
pub async fn load_step(pool: &PgPool, id: DbId) -> AppResult<Step> {
    StepRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Step", id }))
}

/// A segment's seat bindings keyed by role.
async fn seat_map(pool: &PgPool, segment_id: DbId) -> AppResult<BTreeMap<RoleKey, SeatBinding>> {
    let rows = SeatRepo::list_for_segment(pool, segment_id).await?;
    let mut map = BTreeMap::new();
    for row in rows {
        let role = RoleKey::from_str_value(&row.role_key)
            .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
        map.insert(role, row.binding());
    }
    Ok(map)
}

/// The latest decision rows for a step, converted for the gate engine.
async fn latest_decisions(
    pool: &PgPool,
    step_id: DbId,
) -> AppResult<(Vec<Approval>, Vec<RoleDecision>)> {
    let rows = ApprovalRepo::latest_per_role(pool, step_id).await?;
    let mut decisions = Vec::with_capacity(rows.len());
    for row in &rows {
        decisions.push(row.to_role_decision()?);
    }
    Ok((rows, decisions))
}

fn summarize(step: Step, decisions: &[RoleDecision]) -> AppResult<StepSummary> {
    let required = step.required_roles()?;
    let explicit = step.explicit_status()?;
    let latest = gate::latest_per_role(decisions);
    let effective_status = gate::effective_status(&required, &latest, explicit);
    let progress = gate::approval_progress(&required, &latest);
    Ok(StepSummary {
        step,
        effective_status,
        progress,
    })
}

/// Build the read model for one step.
pub async fn step_detail(pool: &PgPool, step_id: DbId) -> AppResult<StepDetail> {
    let step = load_step(pool, step_id).await?;
    let (rows, decisions) = latest_decisions(pool, step_id).await?;
    let summary = summarize(step, &decisions)?;
    Ok(StepDetail {
        summary,
        latest_decisions: rows,
    })
}

/// Build the read model for a whole segment.
pub async fn segment_detail(pool: &PgPool, segment_id: DbId) -> AppResult<SegmentDetail> {
    let segment = load_segment(pool, segment_id).await?;
    let steps = StepRepo::list_by_segment(pool, segment_id).await?;
    let seats = SeatRepo::list_for_segment(pool, segment_id).await?;

    let mut summaries = Vec::with_capacity(steps.len());
    for step in steps {
        let (_, decisions) = latest_decisions(pool, step.id).await?;
        summaries.push(summarize(step, &decisions)?);
    }

    Ok(SegmentDetail {
        segment,
        steps: summaries,
        seats,
    })
}

// ---------------------------------------------------------------------------
// Segment creation
// ---------------------------------------------------------------------------

/// Gate roles that must have a seat before a segment can be created.
fn required_seat_roles(needs_publish: bool) -> Vec<RoleKey> {
    let mut roles = vec![
        RoleKey::ScriptEditor,
        RoleKey::ContentStrategist,
        RoleKey::Director,
        RoleKey::PostSupervisor,
    ];
    if needs_publish {
        roles.push(RoleKey::Publisher);
    }
    roles
}

/// Validate seat assignments against the directory and reduce them to
/// normalized bindings keyed by role.
async fn validate_seats(
    pool: &PgPool,
    seats: &[SeatAssignment],
) -> AppResult<BTreeMap<RoleKey, SeatBinding>> {
    let mut bindings = BTreeMap::new();
    for seat in seats {
        let role = RoleKey::from_str_value(&seat.role_key)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        let binding = SeatBinding {
            person_id: seat.person_id,
            pool_id: seat.pool_id,
        }
        .normalized();

        if let Some(person_id) = binding.person_id {
            if PersonRepo::find_by_id(pool, person_id).await?.is_none() {
                return Err(AppError::Core(CoreError::Conflict(format!(
                    "Seat for '{}' references unknown person {person_id}",
                    role.as_str()
                ))));
            }
        }
        if let Some(pool_id) = binding.pool_id {
            if PoolRepo::find_by_id(pool, pool_id).await?.is_none() {
                return Err(AppError::Core(CoreError::Conflict(format!(
                    "Seat for '{}' references unknown pool {pool_id}",
                    role.as_str()
                ))));
            }
        }
        bindings.insert(role, binding);
    }
    Ok(bindings)
}

/// Create a segment: validate seats, run the scheduler, persist segment,
/// steps, and seats in one transaction.
pub async fn create_segment(
    pool: &PgPool,
    actor: &Actor,
    request: CreateSegmentRequest,
) -> AppResult<CreatedSegment> {
    if request.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Segment title must not be empty".into(),
        )));
    }

    let bindings = validate_seats(pool, &request.seats).await?;
    for role in required_seat_roles(request.needs_publish) {
        let assigned = bindings
            .get(&role)
            .map(|b| !b.is_unassigned())
            .unwrap_or(false);
        if !assigned {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Gate role '{}' has no person or pool assigned",
                role.as_str()
            ))));
        }
    }

    let template: Vec<StepTemplate> = timeline::default_template()
        .into_iter()
        .filter(|s| !s.optional || request.needs_publish)
        .collect();

    let today = Utc::now().date_naive();
    let schedule =
        timeline::schedule(request.production_date, &template, &request.overrides, today)
            .map_err(AppError::Core)?;

    let steps: Vec<CreateStep> = template
        .iter()
        .enumerate()
        .map(|(position, t)| CreateStep {
            segment_id: 0,
            step_key: t.key.clone(),
            name: t.name.clone(),
            phase: t.phase.as_str().to_string(),
            due_date: schedule.due_dates.get(&t.key).copied(),
            assignee_id: None,
            is_gate: t.is_gate,
            gate_roles: t.gate_roles.iter().map(|r| r.as_str().to_string()).collect(),
            position: position as i32,
        })
        .collect();

    let seat_rows: Vec<(String, Option<DbId>, Option<DbId>)> = bindings
        .iter()
        .map(|(role, b)| (role.as_str().to_string(), b.person_id, b.pool_id))
        .collect();

    let create = CreateSegment {
        title: request.title,
        description: request.description,
        owner_id: actor.person_id,
        production_date: request.production_date,
    };
    let (segment, steps) = SegmentRepo::create_with_steps(pool, &create, &steps, &seat_rows)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23503") => {
                AppError::Core(CoreError::PartialFailure(
                    "Segment bootstrap rolled back on a broken reference".into(),
                ))
            }
            other => AppError::Database(other),
        })?;

    tracing::info!(
        segment_id = segment.id,
        owner_id = actor.person_id,
        steps = steps.len(),
        warnings = schedule.warnings.len(),
        "Segment created"
    );

    Ok(CreatedSegment {
        segment,
        steps,
        warnings: schedule.warnings,
    })
}

// ---------------------------------------------------------------------------
// Gate decisions
// ---------------------------------------------------------------------------

/// Record a gate decision for the actor, selecting the role they act for.
pub async fn record_decision(
    pool: &PgPool,
    lock_mode: GateLockMode,
    actor: &Actor,
    step_id: DbId,
    request: DecisionRequest,
) -> AppResult<DecisionOutcome> {
    let step = load_step(pool, step_id).await?;
    let required = step.required_roles()?;
    if !step.is_gate || required.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Step is not a gate; it has no roles to decide for".into(),
        )));
    }

    let seats = seat_map(pool, step.segment_id).await?;
    let (_, decisions) = latest_decisions(pool, step_id).await?;
    let latest = gate::latest_per_role(&decisions);

    let effective = gate::effective_status(&required, &latest, step.explicit_status()?);
    if !lock_mode.accepts_decisions_at(effective) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Step is {} and the gate is locked until it is sent for approvals",
            effective.as_str()
        ))));
    }

    let actor_pool_ids = PoolRepo::pool_ids_for_person(pool, actor.person_id).await?;
    let (role_key, basis) = gate::select_role(
        &required,
        &seats,
        &latest,
        request.role_key,
        actor.person_id,
        &actor_pool_ids,
        actor.org_role,
    )
    .map_err(AppError::Core)?;

    let approval = ApprovalRepo::record(
        pool,
        &RecordApproval {
            step_id,
            role_key,
            approver_id: actor.person_id,
            decision: request.decision,
            comment: request.comment,
        },
    )
    .await?;

    // Re-read the ledger so the reported status reflects this write.
    let (_, decisions) = latest_decisions(pool, step_id).await?;
    let latest = gate::latest_per_role(&decisions);
    let effective_status = gate::effective_status(&required, &latest, step.explicit_status()?);
    let progress = gate::approval_progress(&required, &latest);

    tracing::info!(
        step_id,
        actor_id = actor.person_id,
        role = role_key.as_str(),
        basis = ?basis,
        decision = request.decision.as_str(),
        status = effective_status.as_str(),
        "Gate decision recorded"
    );

    Ok(DecisionOutcome {
        approval,
        role_key,
        basis,
        effective_status,
        progress,
    })
}

// ---------------------------------------------------------------------------
// Lifecycle actions
// ---------------------------------------------------------------------------

fn require_override(actor: &Actor, action: StepAction) -> AppResult<()> {
    if actor.org_role.has_gate_override() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Ineligible(format!(
            "Action {action:?} requires an executive or associate"
        ))))
    }
}

/// Apply an explicit lifecycle action to a step.
pub async fn apply_step_action(
    pool: &PgPool,
    actor: &Actor,
    step_id: DbId,
    action: StepAction,
) -> AppResult<StepSummary> {
    let step = load_step(pool, step_id).await?;

    let new_status = match action {
        StepAction::Start => Some(StepStatus::InProgress),
        StepAction::SendForApprovals => Some(StepStatus::AwaitingApprovals),
        StepAction::RequestChanges => Some(StepStatus::ChangesRequested),
        StepAction::MarkComplete => {
            require_override(actor, action)?;
            Some(StepStatus::Complete)
        }
        StepAction::Reopen => {
            require_override(actor, action)?;
            let (_, decisions) = latest_decisions(pool, step_id).await?;
            let latest = gate::latest_per_role(&decisions);
            let effective = gate::effective_status(
                &step.required_roles()?,
                &latest,
                step.explicit_status()?,
            );
            if !matches!(
                effective,
                StepStatus::Complete | StepStatus::Rejected | StepStatus::ChangesRequested
            ) {
                return Err(AppError::Core(CoreError::Conflict(format!(
                    "Cannot reopen a step that is {}",
                    effective.as_str()
                ))));
            }
            Some(StepStatus::InProgress)
        }
        StepAction::Reset => {
            require_override(actor, action)?;
            None
        }
    };

    let updated = StepRepo::set_status(pool, step_id, new_status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Step",
            id: step_id,
        }))?;

    tracing::info!(
        step_id,
        actor_id = actor.person_id,
        action = ?action,
        "Step lifecycle action applied"
    );

    let (_, decisions) = latest_decisions(pool, step_id).await?;
    summarize(updated, &decisions)
}

// ---------------------------------------------------------------------------
// Schedule recomputation
// ---------------------------------------------------------------------------

/// Reconstruct a scheduling template from a segment's stored step rows.
///
/// Durations come from the default template by key; steps the default
/// template does not know get the minimum duration.
fn template_from_steps(steps: &[Step]) -> AppResult<Vec<StepTemplate>> {
    let defaults: BTreeMap<String, i64> = timeline::default_template()
        .into_iter()
        .map(|t| (t.key, t.default_duration_days))
        .collect();

    steps
        .iter()
        .map(|step| {
            let phase = Phase::from_str_value(&step.phase)
                .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
            Ok(StepTemplate {
                key: step.step_key.clone(),
                name: step.name.clone(),
                phase,
                default_duration_days: defaults
                    .get(&step.step_key)
                    .copied()
                    .unwrap_or(timeline::MIN_DURATION_DAYS),
                is_gate: step.is_gate,
                gate_roles: step.required_roles()?,
                optional: false,
            })
        })
        .collect()
}

/// Re-run the scheduler over a segment's stored steps and rewrite their
/// due dates.
pub async fn recompute_schedule(
    pool: &PgPool,
    segment_id: DbId,
    request: RescheduleRequest,
) -> AppResult<RescheduleOutcome> {
    let segment = load_segment(pool, segment_id).await?;
    let anchor = request.production_date.unwrap_or(segment.production_date);

    let steps = StepRepo::list_by_segment(pool, segment_id).await?;
    let template = template_from_steps(&steps)?;
    let today = Utc::now().date_naive();
    let schedule = timeline::schedule(anchor, &template, &request.overrides, today)
        .map_err(AppError::Core)?;

    // Anchor and due dates land together or not at all.
    let due_dates: Vec<(String, DueDate)> = schedule
        .due_dates
        .iter()
        .map(|(key, date)| (key.clone(), *date))
        .collect();
    let steps =
        SegmentRepo::apply_schedule(pool, segment_id, request.production_date, &due_dates).await?;

    tracing::info!(
        segment_id,
        anchor = %anchor,
        warnings = schedule.warnings.len(),
        "Schedule recomputed"
    );

    Ok(RescheduleOutcome {
        steps,
        warnings: schedule.warnings,
    })
}

// ---------------------------------------------------------------------------
// Pending approvals
// ---------------------------------------------------------------------------

/// Gate steps the actor can still decide for: not fully approved, and the
/// actor is seat-eligible for (or holds the override over) at least one
/// required role lacking an approval.
pub async fn pending_approvals(pool: &PgPool, actor: &Actor) -> AppResult<Vec<PendingApproval>> {
    let actor_pool_ids = PoolRepo::pool_ids_for_person(pool, actor.person_id).await?;
    let segments = SegmentRepo::list_all(pool).await?;

    let mut pending = Vec::new();
    for segment in segments {
        let seats = seat_map(pool, segment.id).await?;
        let steps = StepRepo::list_by_segment(pool, segment.id).await?;
        for step in steps {
            if !step.is_gate {
                continue;
            }
            let required = step.required_roles()?;
            let (_, decisions) = latest_decisions(pool, step.id).await?;
            let latest = gate::latest_per_role(&decisions);
            let effective = gate::effective_status(&required, &latest, step.explicit_status()?);
            if effective == StepStatus::Complete {
                continue;
            }

            let mut roles = Vec::new();
            let mut basis: Option<EligibilityBasis> = None;
            for role in &required {
                if matches!(latest.get(role), Some(d) if d.decision == Decision::Approved) {
                    continue;
                }
                if let Some(b) = eligibility_with_override(
                    seats.get(role),
                    actor.person_id,
                    &actor_pool_ids,
                    actor.org_role,
                ) {
                    roles.push(*role);
                    // Report the strongest basis: seats beat the override.
                    basis = match (basis, b) {
                        (None, b) => Some(b),
                        (Some(EligibilityBasis::OrgOverride), b) => Some(b),
                        (existing, _) => existing,
                    };
                }
            }
            if roles.is_empty() {
                continue;
            }

            let progress = gate::approval_progress(&required, &latest);
            pending.push(PendingApproval {
                segment_id: segment.id,
                segment_title: segment.title.clone(),
                step_id: step.id,
                step_name: step.name.clone(),
                due_date: step.due_date,
                roles,
                basis: basis.unwrap_or(EligibilityBasis::OrgOverride),
                progress,
            });
        }
    }
    Ok(pending)
}

// ---------------------------------------------------------------------------
// Seat updates
// ---------------------------------------------------------------------------

/// Upsert a seat binding after validating the role and references.
pub async fn set_seat(
    pool: &PgPool,
    segment_id: DbId,
    role_key: &str,
    person_id: Option<DbId>,
    pool_id: Option<DbId>,
) -> AppResult<SegmentSeat> {
    load_segment(pool, segment_id).await?;

    let role = RoleKey::from_str_value(role_key)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    let binding = SeatBinding { person_id, pool_id }.normalized();

    if let Some(person_id) = binding.person_id {
        if PersonRepo::find_by_id(pool, person_id).await?.is_none() {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Seat references unknown person {person_id}"
            ))));
        }
    }
    if let Some(pool_id) = binding.pool_id {
        if PoolRepo::find_by_id(pool, pool_id).await?.is_none() {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Seat references unknown pool {pool_id}"
            ))));
        }
    }

    let seat = SeatRepo::upsert(pool, segment_id, role, binding.person_id, binding.pool_id)
        .await?;

    tracing::info!(
        segment_id,
        role = role.as_str(),
        person_id = ?binding.person_id,
        pool_id = ?binding.pool_id,
        "Seat binding updated"
    );

    Ok(seat)
}
