//! Seat resolution: who may act for a (segment, role) pair.
//!
//! Eligibility is computed purely from snapshots the caller loads: the seat
//! binding and the actor's current pool memberships. There is no hidden
//! state; a person removed from a pool mid-decision does not retroactively
//! invalidate an already-recorded decision, because eligibility is checked
//! only at decision time.

use serde::{Deserialize, Serialize};

use crate::roles::OrgRole;
use crate::types::DbId;

/// The active binding of one seat: a person, a pool, or neither.
///
/// Invariant: never both. [`SeatBinding::normalized`] enforces the
/// unconditional person-precedence rule when a caller supplies both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeatBinding {
    pub person_id: Option<DbId>,
    pub pool_id: Option<DbId>,
}

impl SeatBinding {
    /// Apply person precedence: if both a person and a pool were supplied,
    /// keep the person and clear the pool.
    pub fn normalized(self) -> Self {
        if self.person_id.is_some() {
            Self {
                person_id: self.person_id,
                pool_id: None,
            }
        } else {
            self
        }
    }

    /// A seat with neither binding is never eligible for anyone.
    pub fn is_unassigned(&self) -> bool {
        self.person_id.is_none() && self.pool_id.is_none()
    }
}

/// How an actor qualified to act for a role. Recorded alongside decisions
/// so audit can distinguish seat-based action from the override escape
/// hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityBasis {
    /// The seat's person binding matched the actor.
    PersonSeat,
    /// The actor is a current member of the seat's bound pool.
    PoolSeat,
    /// The actor holds the organizational override (executive/associate).
    OrgOverride,
}

/// Seat-based eligibility only: does the actor satisfy this seat?
///
/// Pure given the seat and pool-membership snapshot. A `None` seat (no row
/// configured) and an unassigned seat both yield `None`.
pub fn seat_eligibility(
    seat: Option<&SeatBinding>,
    actor_id: DbId,
    actor_pool_ids: &[DbId],
) -> Option<EligibilityBasis> {
    let seat = seat?;
    if seat.person_id == Some(actor_id) {
        return Some(EligibilityBasis::PersonSeat);
    }
    if let Some(pool_id) = seat.pool_id {
        if actor_pool_ids.contains(&pool_id) {
            return Some(EligibilityBasis::PoolSeat);
        }
    }
    None
}

/// Seat eligibility with the organizational override layered on top.
///
/// Seat-based eligibility always wins when present so the audit basis stays
/// accurate: an executive who also holds the person seat acted as the seat,
/// not via override.
pub fn eligibility_with_override(
    seat: Option<&SeatBinding>,
    actor_id: DbId,
    actor_pool_ids: &[DbId],
    actor_org_role: OrgRole,
) -> Option<EligibilityBasis> {
    seat_eligibility(seat, actor_id, actor_pool_ids).or_else(|| {
        actor_org_role
            .has_gate_override()
            .then_some(EligibilityBasis::OrgOverride)
    })
}
