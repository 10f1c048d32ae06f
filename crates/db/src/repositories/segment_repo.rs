//! Repository for the `segments` table.

use sqlx::PgPool;

use greenlight_core::types::{DbId, DueDate};

use crate::models::segment::{CreateSegment, Segment, UpdateSegment};
use crate::models::step::{CreateStep, Step};

/// Column list for segments queries.
const COLUMNS: &str = "id, title, description, owner_id, production_date, created_at, updated_at";

/// Column list for steps queries (shared with [`super::StepRepo`]).
pub(crate) const STEP_COLUMNS: &str = "id, segment_id, step_key, name, phase, due_date, status, \
    assignee_id, is_gate, gate_roles, position, created_at, updated_at";

/// Column list for segment_seats queries (shared with [`super::SeatRepo`]).
pub(crate) const SEAT_COLUMNS: &str =
    "id, segment_id, role_key, person_id, pool_id, created_at, updated_at";

/// Provides CRUD operations for segments.
pub struct SegmentRepo;

impl SegmentRepo {
    /// Insert a segment together with its step rows and seat bindings in
    /// one transaction. The step DTOs carry a placeholder `segment_id`;
    /// the real ID is assigned here.
    pub async fn create_with_steps(
        pool: &PgPool,
        input: &CreateSegment,
        steps: &[CreateStep],
        seats: &[(String, Option<DbId>, Option<DbId>)],
    ) -> Result<(Segment, Vec<Step>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO segments (title, description, owner_id, production_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let segment = sqlx::query_as::<_, Segment>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.owner_id)
            .bind(input.production_date)
            .fetch_one(&mut *tx)
            .await?;

        let step_query = format!(
            "INSERT INTO steps
                (segment_id, step_key, name, phase, due_date, assignee_id,
                 is_gate, gate_roles, position)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {STEP_COLUMNS}"
        );
        let mut created_steps = Vec::with_capacity(steps.len());
        for step in steps {
            let row = sqlx::query_as::<_, Step>(&step_query)
                .bind(segment.id)
                .bind(&step.step_key)
                .bind(&step.name)
                .bind(&step.phase)
                .bind(step.due_date)
                .bind(step.assignee_id)
                .bind(step.is_gate)
                .bind(&step.gate_roles)
                .bind(step.position)
                .fetch_one(&mut *tx)
                .await?;
            created_steps.push(row);
        }

        for (role_key, person_id, pool_id) in seats {
            sqlx::query(
                "INSERT INTO segment_seats (segment_id, role_key, person_id, pool_id)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(segment.id)
            .bind(role_key)
            .bind(person_id)
            .bind(pool_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok((segment, created_steps))
    }

    /// Find a segment by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM segments WHERE id = $1");
        sqlx::query_as::<_, Segment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all segments, most recently created first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Segment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM segments ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Segment>(&query).fetch_all(pool).await
    }

    /// Partially update a segment, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSegment,
    ) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!(
            "UPDATE segments SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                owner_id = COALESCE($4, owner_id),
                production_date = COALESCE($5, production_date),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.owner_id)
            .bind(input.production_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a segment. Steps, seats and approvals go with it via the
    /// schema's cascades. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM segments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move the production anchor (when given) and rewrite step due dates
    /// in one transaction, so a failed rewrite never leaves the anchor
    /// moved on its own. Keys are step keys; steps absent from the map are
    /// left untouched. Returns the segment's reloaded steps.
    pub async fn apply_schedule(
        pool: &PgPool,
        segment_id: DbId,
        production_date: Option<DueDate>,
        due_dates: &[(String, DueDate)],
    ) -> Result<Vec<Step>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(date) = production_date {
            sqlx::query(
                "UPDATE segments SET production_date = $2, updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(segment_id)
            .bind(date)
            .execute(&mut *tx)
            .await?;
        }

        for (step_key, due_date) in due_dates {
            sqlx::query(
                "UPDATE steps SET due_date = $3, updated_at = NOW()
                 WHERE segment_id = $1 AND step_key = $2",
            )
            .bind(segment_id)
            .bind(step_key)
            .bind(due_date)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "SELECT {STEP_COLUMNS} FROM steps
             WHERE segment_id = $1
             ORDER BY position ASC"
        );
        let steps = sqlx::query_as::<_, Step>(&query)
            .bind(segment_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(steps)
    }
}
