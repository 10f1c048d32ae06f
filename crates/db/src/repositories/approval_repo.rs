//! Repository for the `approvals` ledger.

use sqlx::PgPool;

use greenlight_core::types::DbId;

use crate::models::approval::{Approval, RecordApproval};

/// Column list for approvals queries.
const COLUMNS: &str = "id, step_id, role_key, approver_id, decision, comment, decided_at";

/// Provides operations on the approval ledger.
pub struct ApprovalRepo;

impl ApprovalRepo {
    /// Record a decision. Re-deciding the same (step, role, approver)
    /// triple overwrites the existing row and refreshes `decided_at`.
    pub async fn record(pool: &PgPool, input: &RecordApproval) -> Result<Approval, sqlx::Error> {
        let query = format!(
            "INSERT INTO approvals (step_id, role_key, approver_id, decision, comment)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (step_id, role_key, approver_id)
             DO UPDATE SET decision = $4, comment = $5, decided_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Approval>(&query)
            .bind(input.step_id)
            .bind(input.role_key.as_str())
            .bind(input.approver_id)
            .bind(input.decision.as_str())
            .bind(&input.comment)
            .fetch_one(pool)
            .await
    }

    /// The latest decision per role for a step, across all approvers.
    ///
    /// Most recent `decided_at` wins, row id as the final tie-break.
    pub async fn latest_per_role(
        pool: &PgPool,
        step_id: DbId,
    ) -> Result<Vec<Approval>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT ON (role_key) {COLUMNS} FROM approvals
             WHERE step_id = $1
             ORDER BY role_key ASC, decided_at DESC, id DESC"
        );
        sqlx::query_as::<_, Approval>(&query)
            .bind(step_id)
            .fetch_all(pool)
            .await
    }

    /// Full decision history for a step, newest first.
    pub async fn history_for_step(
        pool: &PgPool,
        step_id: DbId,
    ) -> Result<Vec<Approval>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approvals
             WHERE step_id = $1
             ORDER BY decided_at DESC, id DESC"
        );
        sqlx::query_as::<_, Approval>(&query)
            .bind(step_id)
            .fetch_all(pool)
            .await
    }

    /// Clear a step's ledger. Used when a gate is reset.
    pub async fn delete_for_step(pool: &PgPool, step_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM approvals WHERE step_id = $1")
            .bind(step_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
