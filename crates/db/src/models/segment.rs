//! Segment entity model and DTOs.

use greenlight_core::types::{DbId, DueDate, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `segments` table.
///
/// A segment has no stored lifecycle status; its state is derived from its
/// steps by the workflow layer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Segment {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub owner_id: DbId,
    /// The production anchor date every step's schedule hangs off.
    pub production_date: DueDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a segment row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSegment {
    pub title: String,
    pub description: String,
    pub owner_id: DbId,
    pub production_date: DueDate,
}

/// DTO for updating a segment. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSegment {
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<DbId>,
    pub production_date: Option<DueDate>,
}
