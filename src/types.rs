//! Common types used throughout the client
//!
//! Records shared by several services, and small enums used by the
//! transport and path-building layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Access Levels
// ============================================================================

/// Permission level of a member, encoded as an integer on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum AccessLevel {
    NoPermissions,
    Minimal,
    Guest,
    Planner,
    Reporter,
    Developer,
    Maintainer,
    Owner,
    Admin,
    /// A level this client does not know about
    Other(u8),
}

impl From<u8> for AccessLevel {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::NoPermissions,
            5 => Self::Minimal,
            10 => Self::Guest,
            15 => Self::Planner,
            20 => Self::Reporter,
            30 => Self::Developer,
            40 => Self::Maintainer,
            50 => Self::Owner,
            60 => Self::Admin,
            other => Self::Other(other),
        }
    }
}

impl From<AccessLevel> for u8 {
    fn from(level: AccessLevel) -> Self {
        match level {
            AccessLevel::NoPermissions => 0,
            AccessLevel::Minimal => 5,
            AccessLevel::Guest => 10,
            AccessLevel::Planner => 15,
            AccessLevel::Reporter => 20,
            AccessLevel::Developer => 30,
            AccessLevel::Maintainer => 40,
            AccessLevel::Owner => 50,
            AccessLevel::Admin => 60,
            AccessLevel::Other(value) => value,
        }
    }
}

// ============================================================================
// Resource Kinds
// ============================================================================

/// Top-level namespace an endpoint hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    Group,
}

impl ResourceKind {
    /// Path prefix for this kind (`projects` or `groups`)
    pub fn as_path(self) -> &'static str {
        match self {
            Self::Project => "projects",
            Self::Group => "groups",
        }
    }
}

// ============================================================================
// Shared Records
// ============================================================================

/// Minimal user record embedded in other resources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicUser {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub web_url: String,
}

/// Minimal project record embedded in other resources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicProject {
    pub id: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_with_namespace: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub path_with_namespace: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Commit summary as returned with branches and jobs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    #[serde(default)]
    pub short_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub authored_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub committer_name: String,
    #[serde(default)]
    pub committer_email: String,
    #[serde(default)]
    pub committed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    #[serde(default)]
    pub web_url: String,
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_access_level_wire_format() {
        assert_eq!(
            serde_json::to_value(AccessLevel::Developer).unwrap(),
            json!(30)
        );
        let level: AccessLevel = serde_json::from_value(json!(40)).unwrap();
        assert_eq!(level, AccessLevel::Maintainer);
    }

    #[test]
    fn test_access_level_unknown_value_survives() {
        let level: AccessLevel = serde_json::from_value(json!(35)).unwrap();
        assert_eq!(level, AccessLevel::Other(35));
        assert_eq!(serde_json::to_value(level).unwrap(), json!(35));
    }

    #[test]
    fn test_resource_kind_path() {
        assert_eq!(ResourceKind::Project.as_path(), "projects");
        assert_eq!(ResourceKind::Group.as_path(), "groups");
    }

    #[test]
    fn test_basic_user_tolerates_missing_fields() {
        let user: BasicUser = serde_json::from_value(json!({"id": 7, "username": "jdoe"})).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "jdoe");
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_backoff_type_default() {
        assert_eq!(BackoffType::default(), BackoffType::Exponential);
    }
}
