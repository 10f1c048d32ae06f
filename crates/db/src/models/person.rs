//! Person directory models.

use greenlight_core::roles::OrgRole;
use greenlight_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `people` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Person {
    pub id: DbId,
    pub display_name: String,
    pub email: String,
    /// Storage string; parse with [`OrgRole::from_str_value`].
    pub org_role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Person {
    /// The person's parsed organizational role.
    ///
    /// The column carries a CHECK constraint matching the enum, so a parse
    /// failure means the database and code disagree about the vocabulary.
    pub fn org_role(&self) -> Result<OrgRole, String> {
        OrgRole::from_str_value(&self.org_role)
    }
}

/// DTO for creating a new person.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePerson {
    pub display_name: String,
    pub email: String,
    pub org_role: Option<OrgRole>,
}

/// DTO for updating a person. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePerson {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub org_role: Option<OrgRole>,
}
