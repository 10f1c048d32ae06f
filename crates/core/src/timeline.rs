//! Timeline scheduler: concrete due dates for every step of a segment,
//! computed from the single production anchor date.
//!
//! Pre-production steps are scheduled walking backward from the anchor
//! (work backward from the air date); post-production steps walk forward
//! from it, gap-free (editing cannot start before recording). A strict
//! anchor pins a step to an externally-fixed date and re-seats the walk
//! cursor there.
//!
//! Irregularities degrade to warnings; the scheduler always produces a
//! best-effort date map. The only hard failure is a malformed template.

use std::collections::BTreeMap;

use chrono::Days;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::RoleKey;
use crate::types::DueDate;

/// Minimum duration for any step, in whole days. Attempts to shrink below
/// this are clamped, not rejected.
pub const MIN_DURATION_DAYS: i64 = 1;

/// Which part of the pipeline a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pre,
    Production,
    Post,
}

impl Phase {
    /// Convert to the database string value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Production => "production",
            Self::Post => "post",
        }
    }

    /// Parse from a stored string value. Accepts the legacy `prod`
    /// abbreviation for the production phase.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "pre" => Ok(Self::Pre),
            "production" | "prod" => Ok(Self::Production),
            "post" => Ok(Self::Post),
            other => Err(format!(
                "Invalid phase '{other}'. Must be one of: pre, production, post"
            )),
        }
    }
}

/// One entry of a segment's step template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTemplate {
    /// Stable key identifying the step within the segment.
    pub key: String,
    /// Display name, used in warnings and the UI.
    pub name: String,
    pub phase: Phase,
    /// Default duration in whole days (clamped to at least 1).
    pub default_duration_days: i64,
    pub is_gate: bool,
    /// Required gate roles. Empty unless `is_gate`.
    pub gate_roles: Vec<RoleKey>,
    /// Optional steps are included only when the segment opts in
    /// (the publish step).
    pub optional: bool,
}

/// Per-step scheduling override supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepOverride {
    /// Replaces the template's default duration. Clamped to at least 1.
    pub duration_days: Option<i64>,
    /// Pins the step to this date regardless of computed position.
    pub strict_anchor: Option<DueDate>,
}

/// The scheduler's output: a due date per step key plus advisory warnings.
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub due_dates: BTreeMap<String, DueDate>,
    pub warnings: Vec<String>,
}

/// The canonical pipeline: pre-production drafting and gates, the
/// production day, then the post-production chain with an optional
/// publish gate.
pub fn default_template() -> Vec<StepTemplate> {
    fn entry(
        key: &str,
        name: &str,
        phase: Phase,
        days: i64,
        gate_roles: &[RoleKey],
        optional: bool,
    ) -> StepTemplate {
        StepTemplate {
            key: key.to_string(),
            name: name.to_string(),
            phase,
            default_duration_days: days,
            is_gate: !gate_roles.is_empty(),
            gate_roles: gate_roles.to_vec(),
            optional,
        }
    }

    vec![
        entry("idea_drafting", "Idea Drafting", Phase::Pre, 2, &[], false),
        entry(
            "script_approval",
            "Script Approval",
            Phase::Pre,
            2,
            &[RoleKey::ScriptEditor],
            false,
        ),
        entry(
            "content_strategy",
            "Content Strategy Review",
            Phase::Pre,
            1,
            &[RoleKey::ContentStrategist],
            false,
        ),
        entry(
            "production_recording",
            "Production: Recording",
            Phase::Production,
            1,
            &[],
            false,
        ),
        entry(
            "production_complete",
            "Production Complete",
            Phase::Post,
            1,
            &[RoleKey::Director],
            false,
        ),
        entry(
            "post_editing",
            "Post-Production Editing",
            Phase::Post,
            3,
            &[],
            false,
        ),
        entry(
            "post_final",
            "Post Final Approval",
            Phase::Post,
            1,
            &[RoleKey::PostSupervisor],
            false,
        ),
        entry(
            "publish",
            "Publish",
            Phase::Post,
            1,
            &[RoleKey::Publisher],
            true,
        ),
    ]
}

fn clamp_duration(days: i64) -> u64 {
    days.max(MIN_DURATION_DAYS) as u64
}

fn duration_for(step: &StepTemplate, overrides: &BTreeMap<String, StepOverride>) -> u64 {
    let days = overrides
        .get(&step.key)
        .and_then(|o| o.duration_days)
        .unwrap_or(step.default_duration_days);
    clamp_duration(days)
}

fn strict_anchor_for(
    step: &StepTemplate,
    overrides: &BTreeMap<String, StepOverride>,
) -> Option<DueDate> {
    overrides.get(&step.key).and_then(|o| o.strict_anchor)
}

/// Compute a due date for every template step.
///
/// `today` is passed in by the caller (date-only) so the computation stays
/// pure and testable; the facade passes the current UTC date.
pub fn schedule(
    anchor: DueDate,
    template: &[StepTemplate],
    overrides: &BTreeMap<String, StepOverride>,
    today: DueDate,
) -> Result<Schedule, CoreError> {
    let production: Vec<&StepTemplate> = template
        .iter()
        .filter(|s| s.phase == Phase::Production)
        .collect();
    let production_step = match production.as_slice() {
        [single] => *single,
        [] => {
            return Err(CoreError::InvalidTemplate(
                "Template has no production step".into(),
            ))
        }
        many => {
            return Err(CoreError::InvalidTemplate(format!(
                "Template has {} production steps; exactly one is required",
                many.len()
            )))
        }
    };

    let mut due_dates: BTreeMap<String, DueDate> = BTreeMap::new();
    let mut warnings: Vec<String> = Vec::new();

    // The production step is pinned to the anchor, duration 1 day.
    due_dates.insert(production_step.key.clone(), anchor);

    // Pre-production: walk backward from the anchor in reverse template
    // order. A strict anchor pins the step and resets the cursor.
    let pre: Vec<&StepTemplate> = template.iter().filter(|s| s.phase == Phase::Pre).collect();
    let mut cursor = anchor;
    for step in pre.iter().rev() {
        let due = match strict_anchor_for(step, overrides) {
            Some(pinned) => pinned,
            None => cursor - Days::new(duration_for(step, overrides)),
        };
        due_dates.insert(step.key.clone(), due);
        cursor = due;
    }

    // Post-production: walk forward from the anchor in template order,
    // gap-free. Each step starts the day after the cursor and occupies its
    // full duration; a strict anchor re-seats the cursor at the last day
    // the pinned step occupies.
    let post: Vec<&StepTemplate> = template.iter().filter(|s| s.phase == Phase::Post).collect();
    let mut cursor = anchor;
    for step in &post {
        let duration = duration_for(step, overrides);
        let start = match strict_anchor_for(step, overrides) {
            Some(pinned) => pinned,
            None => cursor + Days::new(1),
        };
        due_dates.insert(step.key.clone(), start);
        cursor = start + Days::new(duration - 1);
    }

    // Lead-time check: worst case ignores strict anchors.
    let needed: i64 = pre
        .iter()
        .map(|s| duration_for(s, overrides) as i64)
        .sum();
    let available = (anchor - today).num_days().saturating_sub(1).max(0);
    if available < needed {
        warnings.push(format!(
            "Not enough pre-production time: need {needed} days but only {available} remain \
             before production ({} days short)",
            needed - available
        ));
    }

    for step in template {
        if let Some(due) = due_dates.get(&step.key) {
            if *due < today {
                warnings.push(format!("{} is before today", step.name));
            }
        }
    }

    Ok(Schedule {
        due_dates,
        warnings,
    })
}
