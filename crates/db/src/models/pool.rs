//! Role pool and membership models.

use greenlight_core::roles::RoleKey;
use greenlight_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `role_pools` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RolePool {
    pub id: DbId,
    pub name: String,
    /// The single role key this pool services.
    pub role_key: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new pool.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePool {
    pub name: String,
    pub role_key: RoleKey,
}

/// A row from the `role_pool_members` join table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PoolMember {
    pub pool_id: DbId,
    pub person_id: DbId,
    pub created_at: Timestamp,
}
