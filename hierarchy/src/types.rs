//! Core types for the role hierarchy.
//!
//! Roles form a forest: every role owns its subroles, and the link back to
//! the parent is kept as data (`parent_role_id`, `path`) rather than as a
//! live reference.
//!
//! With the `typescript` feature enabled, these types can be exported to TypeScript
//! using ts-rs for consistency with the dashboard frontend.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// A node in the organizational permission hierarchy.
///
/// Field names match the records the dashboard frontend consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Role {
    /// Unique identifier across the whole forest
    pub id: String,
    /// Display name, also the last segment of `path`
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Depth in the tree (roots are 0)
    #[serde(default)]
    pub level: u32,
    /// Materialized ancestor chain, e.g. `/CEO/Project Manager`
    #[serde(default)]
    pub path: String,
    /// Parent role, `None` for roots
    #[serde(default)]
    pub parent_role_id: Option<String>,
    /// Permission ids granted to this role (insertion ordered, no duplicates)
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Capability flags
    #[serde(flatten)]
    pub capabilities: Capabilities,
    /// Maximum number of direct subroles (0 = unlimited)
    #[serde(default)]
    pub max_subordinates: u32,
    /// Number of users currently holding this role
    #[serde(default)]
    pub assigned_users: u32,
    /// Direct children, in display order
    #[serde(default)]
    pub subroles: Vec<Role>,
}

impl Role {
    /// Case-sensitive substring match over name and description.
    pub fn matches(&self, term: &str) -> bool {
        self.name.contains(term) || self.description.contains(term)
    }

    /// Whether this role has direct subroles.
    pub fn has_subroles(&self) -> bool {
        !self.subroles.is_empty()
    }

    /// Whether another direct subrole may be added under this role.
    pub fn has_capacity(&self) -> bool {
        self.max_subordinates == 0 || self.subroles.len() < self.max_subordinates as usize
    }
}

/// Boolean capability flags carried by every role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Capabilities {
    #[serde(default)]
    pub can_create_subroles: bool,
    #[serde(default)]
    pub can_assign_roles: bool,
    #[serde(default)]
    pub can_manage_projects: bool,
    #[serde(default)]
    pub can_manage_budgets: bool,
    #[serde(default)]
    pub can_view_reports: bool,
}

impl Capabilities {
    /// Every capability enabled.
    pub fn all() -> Self {
        Self {
            can_create_subroles: true,
            can_assign_roles: true,
            can_manage_projects: true,
            can_manage_budgets: true,
            can_view_reports: true,
        }
    }
}

/// Attributes submitted by the role creation form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RoleDraft {
    /// Explicit id; a UUID is generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub max_subordinates: u32,
}

impl RoleDraft {
    /// Create a draft with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder: set description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set permission ids.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set capability flags.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Builder: cap the number of direct subroles.
    pub fn with_max_subordinates(mut self, max: u32) -> Self {
        self.max_subordinates = max;
        self
    }
}

/// An atomic capability identifier shown on role cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Permission {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Remove duplicate permission ids, keeping first occurrence order.
pub(crate) fn dedup_permissions(permissions: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(permissions.len());
    for permission in permissions {
        if !out.contains(&permission) {
            out.push(permission);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_deserializes_flat_capabilities() {
        let role: Role = serde_json::from_value(serde_json::json!({
            "id": "1",
            "name": "المدير العام",
            "description": "المسؤول الأعلى في النظام",
            "level": 0,
            "path": "/المدير العام",
            "parent_role_id": null,
            "permissions": ["all"],
            "can_create_subroles": true,
            "can_manage_budgets": true,
            "max_subordinates": 10,
            "assigned_users": 1
        }))
        .unwrap();

        assert!(role.capabilities.can_create_subroles);
        assert!(role.capabilities.can_manage_budgets);
        assert!(!role.capabilities.can_assign_roles);
        assert!(role.subroles.is_empty());
        assert_eq!(role.assigned_users, 1);
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let role: Role = serde_json::from_value(serde_json::json!({
            "id": "x",
            "name": "Team Lead",
            "description": "Leads a development team"
        }))
        .unwrap();

        assert!(role.matches("Lead"));
        assert!(role.matches("development"));
        assert!(!role.matches("team lead"));
    }

    #[test]
    fn test_dedup_permissions_keeps_order() {
        let deduped = dedup_permissions(vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
        ]);
        assert_eq!(deduped, vec!["b".to_string(), "a".to_string()]);
    }
}
