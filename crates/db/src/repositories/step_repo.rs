//! Repository for the `steps` table.

use sqlx::PgPool;

use greenlight_core::status::StepStatus;
use greenlight_core::types::DbId;

use crate::models::step::{Step, UpdateStep};
use crate::repositories::segment_repo::STEP_COLUMNS;

/// Provides CRUD operations for steps.
pub struct StepRepo;

impl StepRepo {
    /// Find a step by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Step>, sqlx::Error> {
        let query = format!("SELECT {STEP_COLUMNS} FROM steps WHERE id = $1");
        sqlx::query_as::<_, Step>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a segment's steps in template order.
    pub async fn list_by_segment(
        pool: &PgPool,
        segment_id: DbId,
    ) -> Result<Vec<Step>, sqlx::Error> {
        let query = format!(
            "SELECT {STEP_COLUMNS} FROM steps
             WHERE segment_id = $1
             ORDER BY position ASC"
        );
        sqlx::query_as::<_, Step>(&query)
            .bind(segment_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Double-optional fields distinguish "leave
    /// alone" from "clear to NULL".
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStep,
    ) -> Result<Option<Step>, sqlx::Error> {
        let query = format!(
            "UPDATE steps SET
                due_date = CASE WHEN $2 THEN $3 ELSE due_date END,
                status = CASE WHEN $4 THEN $5 ELSE status END,
                assignee_id = CASE WHEN $6 THEN $7 ELSE assignee_id END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {STEP_COLUMNS}"
        );
        sqlx::query_as::<_, Step>(&query)
            .bind(id)
            .bind(input.due_date.is_some())
            .bind(input.due_date.flatten())
            .bind(input.status.is_some())
            .bind(input.status.flatten().map(StepStatus::as_str))
            .bind(input.assignee_id.is_some())
            .bind(input.assignee_id.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Set or clear a step's explicit status, returning the updated row.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: Option<StepStatus>,
    ) -> Result<Option<Step>, sqlx::Error> {
        let query = format!(
            "UPDATE steps SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {STEP_COLUMNS}"
        );
        sqlx::query_as::<_, Step>(&query)
            .bind(id)
            .bind(status.map(StepStatus::as_str))
            .fetch_optional(pool)
            .await
    }

    /// Delete a step. Its approvals cascade. Returns whether a row was
    /// removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM steps WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
