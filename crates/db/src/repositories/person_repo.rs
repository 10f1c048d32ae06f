//! Repository for the `people` table.

use sqlx::PgPool;

use greenlight_core::types::DbId;

use crate::models::person::{CreatePerson, Person, UpdatePerson};

/// Column list for people queries.
const COLUMNS: &str = "id, display_name, email, org_role, created_at, updated_at";

/// Provides CRUD operations for people.
pub struct PersonRepo;

impl PersonRepo {
    /// Insert a new person, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePerson) -> Result<Person, sqlx::Error> {
        let query = format!(
            "INSERT INTO people (display_name, email, org_role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let org_role = input
            .org_role
            .map(|r| r.as_str())
            .unwrap_or(greenlight_core::roles::ORG_MEMBER);
        sqlx::query_as::<_, Person>(&query)
            .bind(&input.display_name)
            .bind(&input.email)
            .bind(org_role)
            .fetch_one(pool)
            .await
    }

    /// Find a person by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Person>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM people WHERE id = $1");
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all people, ordered by display name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Person>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM people ORDER BY display_name ASC");
        sqlx::query_as::<_, Person>(&query).fetch_all(pool).await
    }

    /// Partially update a person, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePerson,
    ) -> Result<Option<Person>, sqlx::Error> {
        let query = format!(
            "UPDATE people SET
                display_name = COALESCE($2, display_name),
                email = COALESCE($3, email),
                org_role = COALESCE($4, org_role),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(&input.email)
            .bind(input.org_role.map(|r| r.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a person. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
