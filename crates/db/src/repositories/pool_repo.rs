//! Repository for the `role_pools` and `role_pool_members` tables.

use sqlx::PgPool;

use greenlight_core::roles::RoleKey;
use greenlight_core::types::DbId;

use crate::models::pool::{CreatePool, PoolMember, RolePool};

/// Column list for role_pools queries.
const COLUMNS: &str = "id, name, role_key, created_at, updated_at";

/// Provides CRUD operations for role pools and their membership.
pub struct PoolRepo;

impl PoolRepo {
    /// Insert a new pool, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePool) -> Result<RolePool, sqlx::Error> {
        let query = format!(
            "INSERT INTO role_pools (name, role_key)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RolePool>(&query)
            .bind(&input.name)
            .bind(input.role_key.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a pool by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RolePool>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM role_pools WHERE id = $1");
        sqlx::query_as::<_, RolePool>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all pools, ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<RolePool>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM role_pools ORDER BY name ASC");
        sqlx::query_as::<_, RolePool>(&query).fetch_all(pool).await
    }

    /// List pools serving a given role, ordered by name.
    pub async fn list_for_role(
        pool: &PgPool,
        role_key: RoleKey,
    ) -> Result<Vec<RolePool>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM role_pools WHERE role_key = $1 ORDER BY name ASC"
        );
        sqlx::query_as::<_, RolePool>(&query)
            .bind(role_key.as_str())
            .fetch_all(pool)
            .await
    }

    /// Delete a pool. Memberships and seat bindings referencing it are
    /// cleaned up by the schema (CASCADE / SET NULL).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM role_pools WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add a person to a pool. Idempotent on re-add.
    pub async fn add_member(
        pool: &PgPool,
        pool_id: DbId,
        person_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO role_pool_members (pool_id, person_id)
             VALUES ($1, $2)
             ON CONFLICT (pool_id, person_id) DO NOTHING",
        )
        .bind(pool_id)
        .bind(person_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove a person from a pool. Returns whether a row was removed.
    pub async fn remove_member(
        pool: &PgPool,
        pool_id: DbId,
        person_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM role_pool_members WHERE pool_id = $1 AND person_id = $2")
                .bind(pool_id)
                .bind(person_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the members of a pool.
    pub async fn list_members(
        pool: &PgPool,
        pool_id: DbId,
    ) -> Result<Vec<PoolMember>, sqlx::Error> {
        sqlx::query_as::<_, PoolMember>(
            "SELECT pool_id, person_id, created_at
             FROM role_pool_members
             WHERE pool_id = $1
             ORDER BY person_id ASC",
        )
        .bind(pool_id)
        .fetch_all(pool)
        .await
    }

    /// Member person IDs of a pool. Used for pool-seat eligibility checks.
    pub async fn member_ids(pool: &PgPool, pool_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT person_id FROM role_pool_members WHERE pool_id = $1 ORDER BY person_id ASC",
        )
        .bind(pool_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Pool IDs a person belongs to.
    pub async fn pool_ids_for_person(
        pool: &PgPool,
        person_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT pool_id FROM role_pool_members WHERE person_id = $1 ORDER BY pool_id ASC",
        )
        .bind(person_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
