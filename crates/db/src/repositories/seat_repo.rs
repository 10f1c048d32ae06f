//! Repository for the `segment_seats` table.

use sqlx::PgPool;

use greenlight_core::roles::RoleKey;
use greenlight_core::types::DbId;

use crate::models::seat::SegmentSeat;
use crate::repositories::segment_repo::SEAT_COLUMNS;

/// Provides seat binding operations. One row per (segment, role).
pub struct SeatRepo;

impl SeatRepo {
    /// Insert or replace a seat binding for a (segment, role) pair.
    pub async fn upsert(
        pool: &PgPool,
        segment_id: DbId,
        role_key: RoleKey,
        person_id: Option<DbId>,
        pool_id: Option<DbId>,
    ) -> Result<SegmentSeat, sqlx::Error> {
        let query = format!(
            "INSERT INTO segment_seats (segment_id, role_key, person_id, pool_id)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (segment_id, role_key)
             DO UPDATE SET person_id = $3, pool_id = $4, updated_at = NOW()
             RETURNING {SEAT_COLUMNS}"
        );
        sqlx::query_as::<_, SegmentSeat>(&query)
            .bind(segment_id)
            .bind(role_key.as_str())
            .bind(person_id)
            .bind(pool_id)
            .fetch_one(pool)
            .await
    }

    /// List a segment's seats, ordered by role key.
    pub async fn list_for_segment(
        pool: &PgPool,
        segment_id: DbId,
    ) -> Result<Vec<SegmentSeat>, sqlx::Error> {
        let query = format!(
            "SELECT {SEAT_COLUMNS} FROM segment_seats
             WHERE segment_id = $1
             ORDER BY role_key ASC"
        );
        sqlx::query_as::<_, SegmentSeat>(&query)
            .bind(segment_id)
            .fetch_all(pool)
            .await
    }
}
