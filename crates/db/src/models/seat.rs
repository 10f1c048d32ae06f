//! Segment seat model.

use greenlight_core::seats::SeatBinding;
use greenlight_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `segment_seats` table. One seat per (segment, role).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SegmentSeat {
    pub id: DbId,
    pub segment_id: DbId,
    pub role_key: String,
    pub person_id: Option<DbId>,
    pub pool_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SegmentSeat {
    /// The seat's binding with person-precedence applied.
    pub fn binding(&self) -> SeatBinding {
        SeatBinding {
            person_id: self.person_id,
            pool_id: self.pool_id,
        }
        .normalized()
    }
}
