//! Role vocabularies: gate role keys and organizational roles.
//!
//! Both are closed enumerations stored as snake_case strings in the
//! database. Display labels live here so presentation strings never leak
//! into state handling.

use serde::{Deserialize, Serialize};

/// Storage strings for gate role keys.
pub const ROLE_SCRIPT_EDITOR: &str = "script_editor";
pub const ROLE_CONTENT_STRATEGIST: &str = "content_strategist";
pub const ROLE_DIRECTOR: &str = "director";
pub const ROLE_POST_SUPERVISOR: &str = "post_supervisor";
pub const ROLE_PRODUCER: &str = "producer";
pub const ROLE_PUBLISHER: &str = "publisher";

/// All valid role key strings.
pub const VALID_ROLE_KEYS: &[&str] = &[
    ROLE_SCRIPT_EDITOR,
    ROLE_CONTENT_STRATEGIST,
    ROLE_DIRECTOR,
    ROLE_POST_SUPERVISOR,
    ROLE_PRODUCER,
    ROLE_PUBLISHER,
];

/// A role a seat can be bound for within a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKey {
    ScriptEditor,
    ContentStrategist,
    Director,
    PostSupervisor,
    Producer,
    Publisher,
}

impl RoleKey {
    /// Convert to the database string value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScriptEditor => ROLE_SCRIPT_EDITOR,
            Self::ContentStrategist => ROLE_CONTENT_STRATEGIST,
            Self::Director => ROLE_DIRECTOR,
            Self::PostSupervisor => ROLE_POST_SUPERVISOR,
            Self::Producer => ROLE_PRODUCER,
            Self::Publisher => ROLE_PUBLISHER,
        }
    }

    /// Parse from a stored string value.
    ///
    /// Accepts two legacy aliases that survive in old rows: `pitch_editor`
    /// (renamed to script_editor) and `final_reviewer` (renamed to
    /// post_supervisor).
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            ROLE_SCRIPT_EDITOR | "pitch_editor" => Ok(Self::ScriptEditor),
            ROLE_CONTENT_STRATEGIST => Ok(Self::ContentStrategist),
            ROLE_DIRECTOR => Ok(Self::Director),
            ROLE_POST_SUPERVISOR | "final_reviewer" => Ok(Self::PostSupervisor),
            ROLE_PRODUCER => Ok(Self::Producer),
            ROLE_PUBLISHER => Ok(Self::Publisher),
            other => Err(format!(
                "Invalid role key '{other}'. Must be one of: {}",
                VALID_ROLE_KEYS.join(", ")
            )),
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::ScriptEditor => "Script Editor",
            Self::ContentStrategist => "Content Strategist",
            Self::Director => "Director",
            Self::PostSupervisor => "Post Supervisor",
            Self::Producer => "Producer",
            Self::Publisher => "Publisher",
        }
    }
}

/// Organizational role strings (people directory).
pub const ORG_EXECUTIVE: &str = "executive";
pub const ORG_ASSOCIATE: &str = "associate";
pub const ORG_MEMBER: &str = "member";

/// All valid organizational role strings.
pub const VALID_ORG_ROLES: &[&str] = &[ORG_EXECUTIVE, ORG_ASSOCIATE, ORG_MEMBER];

/// A person's organizational role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    Executive,
    Associate,
    Member,
}

impl OrgRole {
    /// Convert to the database string value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Executive => ORG_EXECUTIVE,
            Self::Associate => ORG_ASSOCIATE,
            Self::Member => ORG_MEMBER,
        }
    }

    /// Parse from a stored string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            ORG_EXECUTIVE => Ok(Self::Executive),
            ORG_ASSOCIATE => Ok(Self::Associate),
            ORG_MEMBER => Ok(Self::Member),
            other => Err(format!(
                "Invalid org role '{other}'. Must be one of: {}",
                VALID_ORG_ROLES.join(", ")
            )),
        }
    }

    /// Whether this organizational role may act for any gate role on any
    /// step, regardless of seat bindings. This is the escape hatch for
    /// stuck workflows; it is always layered on top of seat resolution so
    /// audit can tell the two apart.
    pub fn has_gate_override(self) -> bool {
        matches!(self, Self::Executive | Self::Associate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_key_round_trips() {
        for s in VALID_ROLE_KEYS {
            assert_eq!(RoleKey::from_str_value(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn legacy_aliases_normalize() {
        assert_eq!(
            RoleKey::from_str_value("pitch_editor").unwrap(),
            RoleKey::ScriptEditor
        );
        assert_eq!(
            RoleKey::from_str_value("final_reviewer").unwrap(),
            RoleKey::PostSupervisor
        );
    }

    #[test]
    fn role_key_parse_trims_and_lowercases() {
        assert_eq!(
            RoleKey::from_str_value("  Director ").unwrap(),
            RoleKey::Director
        );
    }

    #[test]
    fn unknown_role_key_rejected() {
        let err = RoleKey::from_str_value("gaffer").unwrap_err();
        assert!(err.contains("Invalid role key"));
    }

    #[test]
    fn override_only_for_senior_roles() {
        assert!(OrgRole::Executive.has_gate_override());
        assert!(OrgRole::Associate.has_gate_override());
        assert!(!OrgRole::Member.has_gate_override());
    }

    #[test]
    fn labels_are_decoupled_from_storage() {
        assert_eq!(RoleKey::ScriptEditor.label(), "Script Editor");
        assert_eq!(RoleKey::ScriptEditor.as_str(), "script_editor");
    }
}
