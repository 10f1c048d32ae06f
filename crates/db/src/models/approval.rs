//! Approval ledger model and DTOs.

use greenlight_core::approval::Decision;
use greenlight_core::error::CoreError;
use greenlight_core::gate::RoleDecision;
use greenlight_core::roles::RoleKey;
use greenlight_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `approvals` table. One row per (step, role, approver);
/// re-deciding overwrites in place.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Approval {
    pub id: DbId,
    pub step_id: DbId,
    pub role_key: String,
    pub approver_id: DbId,
    pub decision: String,
    pub comment: Option<String>,
    pub decided_at: Timestamp,
}

impl Approval {
    pub fn to_role_decision(&self) -> Result<RoleDecision, CoreError> {
        let role_key = RoleKey::from_str_value(&self.role_key).map_err(CoreError::Internal)?;
        let decision = Decision::from_str_value(&self.decision).map_err(CoreError::Internal)?;
        Ok(RoleDecision {
            id: self.id,
            role_key,
            approver_id: self.approver_id,
            decision,
            decided_at: self.decided_at,
        })
    }
}

/// DTO for recording (or overwriting) a decision.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordApproval {
    pub step_id: DbId,
    pub role_key: RoleKey,
    pub approver_id: DbId,
    pub decision: Decision,
    pub comment: Option<String>,
}
