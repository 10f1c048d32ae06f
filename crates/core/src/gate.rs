//! Gate engine: derives a step's lifecycle status from its approval
//! history and selects which role an actor decides for.
//!
//! Status handling is two-layered. An explicit status set by an
//! administrative action is authoritative; the derived value computed from
//! the ledger fills the gap when no explicit status exists. Non-gated steps
//! (empty required-role set) have nothing to derive from, so they are
//! driven solely by explicit status.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::approval::Decision;
use crate::error::CoreError;
use crate::roles::{OrgRole, RoleKey};
use crate::seats::{eligibility_with_override, seat_eligibility, EligibilityBasis, SeatBinding};
use crate::status::StepStatus;
use crate::types::{DbId, Timestamp};

/// One decision row from the ledger, as loaded by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDecision {
    pub id: DbId,
    pub role_key: RoleKey,
    pub approver_id: DbId,
    pub decision: Decision,
    pub decided_at: Timestamp,
}

/// Whether a step accepts decisions outside `AwaitingApprovals`.
///
/// The two modes exist because workflows were run both ways: some surfaces
/// lock gates until a step is explicitly sent for approval, others accept
/// direct decisions at any time. Exposed as a configuration flag rather
/// than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateLockMode {
    /// Decisions are accepted at any effective status.
    AlwaysOpen,
    /// Decisions are accepted only while the step is `AwaitingApprovals`.
    Locked,
}

impl GateLockMode {
    /// Parse from a configuration string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "always_open" => Ok(Self::AlwaysOpen),
            "locked" => Ok(Self::Locked),
            other => Err(format!(
                "Invalid gate lock mode '{other}'. Must be 'always_open' or 'locked'"
            )),
        }
    }

    /// Whether a decision may be recorded at the given effective status.
    pub fn accepts_decisions_at(self, effective: StepStatus) -> bool {
        match self {
            Self::AlwaysOpen => true,
            Self::Locked => effective == StepStatus::AwaitingApprovals,
        }
    }
}

/// Reduce a ledger slice to the latest relevant decision per role.
///
/// "Latest" is across all approvers for that role, most recent
/// `decided_at` first, row id as the final tie-break. Two pool members may
/// both hold a current decision for the same role; the newer one counts.
pub fn latest_per_role(decisions: &[RoleDecision]) -> BTreeMap<RoleKey, &RoleDecision> {
    let mut latest: BTreeMap<RoleKey, &RoleDecision> = BTreeMap::new();
    for d in decisions {
        match latest.get(&d.role_key) {
            Some(current)
                if (current.decided_at, current.id) >= (d.decided_at, d.id) => {}
            _ => {
                latest.insert(d.role_key, d);
            }
        }
    }
    latest
}

/// Derive a status from the approval ledger alone (no explicit override).
pub fn derive_status(
    required: &[RoleKey],
    latest: &BTreeMap<RoleKey, &RoleDecision>,
) -> StepStatus {
    let relevant = |rk: &RoleKey| latest.get(rk);

    if required
        .iter()
        .filter_map(relevant)
        .any(|d| d.decision == Decision::Rejected)
    {
        return StepStatus::Rejected;
    }
    if !required.is_empty()
        && required
            .iter()
            .all(|rk| matches!(latest.get(rk), Some(d) if d.decision == Decision::Approved))
    {
        return StepStatus::Complete;
    }
    if required.iter().any(|rk| latest.contains_key(rk)) {
        return StepStatus::InProgress;
    }
    StepStatus::NotStarted
}

/// Effective status: explicit override when set, derived otherwise.
pub fn effective_status(
    required: &[RoleKey],
    latest: &BTreeMap<RoleKey, &RoleDecision>,
    explicit: Option<StepStatus>,
) -> StepStatus {
    explicit.unwrap_or_else(|| derive_status(required, latest))
}

/// Approval progress for caller feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApprovalProgress {
    /// Required roles whose latest decision is `approved`.
    pub approved_roles: usize,
    /// Total required roles on the step.
    pub total_roles: usize,
    /// `approved / total`, rounded to the nearest integer percent.
    pub percent: u8,
}

/// Compute approval progress over the required-role set.
pub fn approval_progress(
    required: &[RoleKey],
    latest: &BTreeMap<RoleKey, &RoleDecision>,
) -> ApprovalProgress {
    let total_roles = required.len();
    let approved_roles = required
        .iter()
        .filter(|rk| matches!(latest.get(rk), Some(d) if d.decision == Decision::Approved))
        .count();
    let percent = if total_roles == 0 {
        0
    } else {
        ((approved_roles as f64 / total_roles as f64) * 100.0).round() as u8
    };
    ApprovalProgress {
        approved_roles,
        total_roles,
        percent,
    }
}

/// Select the role an actor decides for on a gate step.
///
/// Order: the hint, when it names a required role the actor is eligible
/// for; else a required role where the actor holds the person seat; else
/// one where the actor qualifies via pool membership; else, for
/// override-holders, the first required role without an approval yet
/// (falling back to the first required role when all are decided).
pub fn select_role(
    required: &[RoleKey],
    seats: &BTreeMap<RoleKey, SeatBinding>,
    latest: &BTreeMap<RoleKey, &RoleDecision>,
    hint: Option<RoleKey>,
    actor_id: DbId,
    actor_pool_ids: &[DbId],
    actor_org_role: OrgRole,
) -> Result<(RoleKey, EligibilityBasis), CoreError> {
    if required.is_empty() {
        return Err(CoreError::Ineligible(
            "Step has no required gate roles".into(),
        ));
    }

    if let Some(hinted) = hint {
        if required.contains(&hinted) {
            if let Some(basis) = eligibility_with_override(
                seats.get(&hinted),
                actor_id,
                actor_pool_ids,
                actor_org_role,
            ) {
                return Ok((hinted, basis));
            }
        }
    }

    for rk in required {
        if seat_eligibility(seats.get(rk), actor_id, actor_pool_ids)
            == Some(EligibilityBasis::PersonSeat)
        {
            return Ok((*rk, EligibilityBasis::PersonSeat));
        }
    }
    for rk in required {
        if seat_eligibility(seats.get(rk), actor_id, actor_pool_ids)
            == Some(EligibilityBasis::PoolSeat)
        {
            return Ok((*rk, EligibilityBasis::PoolSeat));
        }
    }

    if actor_org_role.has_gate_override() {
        let undecided = required.iter().find(|rk| {
            !matches!(latest.get(rk), Some(d) if d.decision == Decision::Approved)
        });
        let rk = undecided.or_else(|| required.first()).copied();
        if let Some(rk) = rk {
            return Ok((rk, EligibilityBasis::OrgOverride));
        }
    }

    Err(CoreError::Ineligible(
        "Actor may not act for any required role on this step".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn at(minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap()
    }

    fn decision(
        id: DbId,
        role_key: RoleKey,
        approver_id: DbId,
        decision: Decision,
        minute: u32,
    ) -> RoleDecision {
        RoleDecision {
            id,
            role_key,
            approver_id,
            decision,
            decided_at: at(minute),
        }
    }

    // -----------------------------------------------------------------------
    // latest_per_role
    // -----------------------------------------------------------------------

    #[test]
    fn latest_per_role_absent_when_no_decision() {
        let latest = latest_per_role(&[]);
        assert!(latest.is_empty());
    }

    #[test]
    fn latest_per_role_most_recent_across_approvers() {
        // Approver 1 approves, approver 2 rejects later: rejection wins.
        let rows = vec![
            decision(1, RoleKey::ScriptEditor, 1, Decision::Approved, 0),
            decision(2, RoleKey::ScriptEditor, 2, Decision::Rejected, 5),
        ];
        let latest = latest_per_role(&rows);
        assert_eq!(
            latest[&RoleKey::ScriptEditor].decision,
            Decision::Rejected
        );
    }

    #[test]
    fn latest_per_role_tie_broken_by_id() {
        let rows = vec![
            decision(1, RoleKey::Director, 1, Decision::Approved, 3),
            decision(2, RoleKey::Director, 2, Decision::Rejected, 3),
        ];
        let latest = latest_per_role(&rows);
        assert_eq!(latest[&RoleKey::Director].id, 2);
    }

    // -----------------------------------------------------------------------
    // Derivation
    // -----------------------------------------------------------------------

    #[test]
    fn all_roles_approved_derives_complete() {
        let required = [RoleKey::ScriptEditor, RoleKey::ContentStrategist];
        let rows = vec![
            decision(1, RoleKey::ScriptEditor, 1, Decision::Approved, 0),
            decision(2, RoleKey::ContentStrategist, 2, Decision::Approved, 1),
        ];
        let latest = latest_per_role(&rows);
        assert_eq!(derive_status(&required, &latest), StepStatus::Complete);
    }

    #[test]
    fn any_rejection_derives_rejected_regardless_of_order() {
        let required = [RoleKey::ScriptEditor, RoleKey::ContentStrategist];
        let rows = vec![
            decision(1, RoleKey::ScriptEditor, 1, Decision::Approved, 0),
            decision(2, RoleKey::ContentStrategist, 2, Decision::Rejected, 1),
        ];
        let latest = latest_per_role(&rows);
        assert_eq!(derive_status(&required, &latest), StepStatus::Rejected);
    }

    #[test]
    fn partial_decisions_derive_in_progress() {
        let required = [RoleKey::ScriptEditor, RoleKey::ContentStrategist];
        let rows = vec![decision(1, RoleKey::ScriptEditor, 1, Decision::Approved, 0)];
        let latest = latest_per_role(&rows);
        assert_eq!(derive_status(&required, &latest), StepStatus::InProgress);
    }

    #[test]
    fn no_decisions_derive_not_started() {
        let required = [RoleKey::ScriptEditor];
        let latest = BTreeMap::new();
        assert_eq!(derive_status(&required, &latest), StepStatus::NotStarted);
    }

    #[test]
    fn empty_required_set_never_derives_complete() {
        let latest = BTreeMap::new();
        assert_eq!(derive_status(&[], &latest), StepStatus::NotStarted);
    }

    #[test]
    fn explicit_status_wins_over_derived() {
        let required = [RoleKey::ScriptEditor];
        let rows = vec![decision(1, RoleKey::ScriptEditor, 1, Decision::Approved, 0)];
        let latest = latest_per_role(&rows);
        assert_eq!(
            effective_status(&required, &latest, Some(StepStatus::ChangesRequested)),
            StepStatus::ChangesRequested
        );
        assert_eq!(
            effective_status(&required, &latest, None),
            StepStatus::Complete
        );
    }

    #[test]
    fn newer_rejection_flips_single_role_gate() {
        // Pool members A and B both decide the same role; most recent wins.
        let required = [RoleKey::ScriptEditor];
        let rows = vec![
            decision(1, RoleKey::ScriptEditor, 1, Decision::Approved, 0),
            decision(2, RoleKey::ScriptEditor, 2, Decision::Rejected, 10),
        ];
        let latest = latest_per_role(&rows);
        assert_eq!(derive_status(&required, &latest), StepStatus::Rejected);
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    #[test]
    fn progress_rounds_to_nearest_percent() {
        let required = [
            RoleKey::ScriptEditor,
            RoleKey::ContentStrategist,
            RoleKey::Director,
        ];
        let rows = vec![decision(1, RoleKey::ScriptEditor, 1, Decision::Approved, 0)];
        let latest = latest_per_role(&rows);
        let progress = approval_progress(&required, &latest);
        assert_eq!(progress.approved_roles, 1);
        assert_eq!(progress.total_roles, 3);
        assert_eq!(progress.percent, 33);
    }

    #[test]
    fn progress_on_non_gate_step_is_zero() {
        let latest = BTreeMap::new();
        let progress = approval_progress(&[], &latest);
        assert_eq!(progress.percent, 0);
    }

    #[test]
    fn rejected_roles_do_not_count_as_approved() {
        let required = [RoleKey::ScriptEditor, RoleKey::Director];
        let rows = vec![
            decision(1, RoleKey::ScriptEditor, 1, Decision::Approved, 0),
            decision(2, RoleKey::Director, 2, Decision::Rejected, 1),
        ];
        let latest = latest_per_role(&rows);
        assert_eq!(approval_progress(&required, &latest).approved_roles, 1);
    }

    // -----------------------------------------------------------------------
    // Gate lock
    // -----------------------------------------------------------------------

    #[test]
    fn always_open_accepts_any_status() {
        assert!(GateLockMode::AlwaysOpen.accepts_decisions_at(StepStatus::NotStarted));
        assert!(GateLockMode::AlwaysOpen.accepts_decisions_at(StepStatus::Complete));
    }

    #[test]
    fn locked_accepts_only_awaiting_approvals() {
        assert!(GateLockMode::Locked.accepts_decisions_at(StepStatus::AwaitingApprovals));
        assert!(!GateLockMode::Locked.accepts_decisions_at(StepStatus::InProgress));
        assert!(!GateLockMode::Locked.accepts_decisions_at(StepStatus::NotStarted));
    }

    #[test]
    fn lock_mode_parses_from_config() {
        assert_eq!(
            GateLockMode::from_str_value("locked").unwrap(),
            GateLockMode::Locked
        );
        assert!(GateLockMode::from_str_value("open").is_err());
    }

    // -----------------------------------------------------------------------
    // Role selection
    // -----------------------------------------------------------------------

    fn seats_with(role_key: RoleKey, binding: SeatBinding) -> BTreeMap<RoleKey, SeatBinding> {
        let mut seats = BTreeMap::new();
        seats.insert(role_key, binding);
        seats
    }

    #[test]
    fn hint_used_when_eligible() {
        let required = [RoleKey::ScriptEditor, RoleKey::Director];
        let seats = seats_with(
            RoleKey::Director,
            SeatBinding {
                person_id: Some(5),
                pool_id: None,
            },
        );
        let latest = BTreeMap::new();
        let (rk, basis) = select_role(
            &required,
            &seats,
            &latest,
            Some(RoleKey::Director),
            5,
            &[],
            OrgRole::Member,
        )
        .unwrap();
        assert_eq!(rk, RoleKey::Director);
        assert_eq!(basis, EligibilityBasis::PersonSeat);
    }

    #[test]
    fn ineligible_hint_falls_back_to_seat_selection() {
        let required = [RoleKey::ScriptEditor, RoleKey::Director];
        let seats = seats_with(
            RoleKey::ScriptEditor,
            SeatBinding {
                person_id: Some(5),
                pool_id: None,
            },
        );
        let latest = BTreeMap::new();
        let (rk, _) = select_role(
            &required,
            &seats,
            &latest,
            Some(RoleKey::Director),
            5,
            &[],
            OrgRole::Member,
        )
        .unwrap();
        assert_eq!(rk, RoleKey::ScriptEditor);
    }

    #[test]
    fn person_seat_preferred_over_pool_seat() {
        let required = [RoleKey::ScriptEditor, RoleKey::Director];
        let mut seats = BTreeMap::new();
        seats.insert(
            RoleKey::ScriptEditor,
            SeatBinding {
                person_id: None,
                pool_id: Some(3),
            },
        );
        seats.insert(
            RoleKey::Director,
            SeatBinding {
                person_id: Some(5),
                pool_id: None,
            },
        );
        let latest = BTreeMap::new();
        let (rk, basis) =
            select_role(&required, &seats, &latest, None, 5, &[3], OrgRole::Member).unwrap();
        assert_eq!(rk, RoleKey::Director);
        assert_eq!(basis, EligibilityBasis::PersonSeat);
    }

    #[test]
    fn override_picks_first_unapproved_role() {
        let required = [RoleKey::ScriptEditor, RoleKey::Director];
        let seats = BTreeMap::new();
        let rows = vec![decision(1, RoleKey::ScriptEditor, 1, Decision::Approved, 0)];
        let latest = latest_per_role(&rows);
        let (rk, basis) = select_role(
            &required,
            &seats,
            &latest,
            None,
            9,
            &[],
            OrgRole::Executive,
        )
        .unwrap();
        assert_eq!(rk, RoleKey::Director);
        assert_eq!(basis, EligibilityBasis::OrgOverride);
    }

    #[test]
    fn override_falls_back_to_first_role_when_all_decided() {
        let required = [RoleKey::ScriptEditor, RoleKey::Director];
        let seats = BTreeMap::new();
        let rows = vec![
            decision(1, RoleKey::ScriptEditor, 1, Decision::Approved, 0),
            decision(2, RoleKey::Director, 2, Decision::Approved, 1),
        ];
        let latest = latest_per_role(&rows);
        let (rk, _) = select_role(
            &required,
            &seats,
            &latest,
            None,
            9,
            &[],
            OrgRole::Associate,
        )
        .unwrap();
        assert_eq!(rk, RoleKey::ScriptEditor);
    }

    #[test]
    fn no_eligible_role_is_ineligible() {
        let required = [RoleKey::ScriptEditor];
        let seats = seats_with(
            RoleKey::ScriptEditor,
            SeatBinding {
                person_id: Some(1),
                pool_id: None,
            },
        );
        let latest = BTreeMap::new();
        let result = select_role(&required, &seats, &latest, None, 2, &[], OrgRole::Member);
        assert_matches!(result, Err(CoreError::Ineligible(_)));
    }

    #[test]
    fn non_gate_step_is_ineligible() {
        let seats = BTreeMap::new();
        let latest = BTreeMap::new();
        let result = select_role(&[], &seats, &latest, None, 1, &[], OrgRole::Executive);
        assert_matches!(result, Err(CoreError::Ineligible(_)));
    }
}
