//! Permission catalog.
//!
//! Static reference data mapping permission ids to display names and
//! descriptions. Roles store ids only; the catalog is consulted for display
//! and for validating permission edits.

use crate::types::{Permission, Role};

/// Permission id granting everything. Not listed in the catalog itself.
pub const WILDCARD_PERMISSION: &str = "all";

/// Lookup table of known permissions.
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    permissions: Vec<Permission>,
}

impl PermissionCatalog {
    /// The permissions offered by the role creation form.
    pub fn standard() -> Self {
        let entry = |id: &str, name: &str, description: &str| Permission {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        };

        Self {
            permissions: vec![
                entry("project_management", "إدارة المشاريع", "إنشاء وتعديل وحذف المشاريع"),
                entry("task_management", "إدارة المهام", "إنشاء وتعديل وحذف المهام"),
                entry("user_management", "إدارة المستخدمين", "إضافة وتعديل المستخدمين"),
                entry("role_management", "إدارة الأدوار", "إنشاء وتعديل الأدوار"),
                entry("budget_management", "إدارة الميزانية", "إدارة الميزانيات والتكاليف"),
                entry("report_viewing", "عرض التقارير", "الوصول إلى التقارير والإحصائيات"),
                entry("team_coordination", "تنسيق الفريق", "تنسيق العمل بين أعضاء الفريق"),
                entry("hr_management", "إدارة الموارد البشرية", "إدارة شؤون الموظفين"),
            ],
        }
    }

    /// Build a catalog from arbitrary entries.
    pub fn from_permissions(permissions: Vec<Permission>) -> Self {
        Self { permissions }
    }

    /// Look up a permission by id.
    pub fn get(&self, id: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.id == id)
    }

    /// Whether `id` is a catalog entry or the wildcard.
    pub fn is_known(&self, id: &str) -> bool {
        id == WILDCARD_PERMISSION || self.get(id).is_some()
    }

    /// All entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Resolve a role's permission ids into catalog entries.
    pub fn describe<'a>(&'a self, role: &'a Role) -> PermissionDescription<'a> {
        let mut description = PermissionDescription::default();

        for id in &role.permissions {
            if id == WILDCARD_PERMISSION {
                description.wildcard = true;
            } else if let Some(permission) = self.get(id) {
                description.known.push(permission);
            } else {
                description.unknown.push(id.as_str());
            }
        }

        description
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// A role's permissions resolved against the catalog.
#[derive(Debug, Default)]
pub struct PermissionDescription<'a> {
    /// Entries found in the catalog, in the role's order
    pub known: Vec<&'a Permission>,
    /// Ids the catalog does not know
    pub unknown: Vec<&'a str>,
    /// Whether the role holds the wildcard
    pub wildcard: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = PermissionCatalog::standard();
        assert_eq!(catalog.len(), 8);
        assert_eq!(
            catalog.get("budget_management").map(|p| p.name.as_str()),
            Some("إدارة الميزانية")
        );
        assert!(catalog.is_known(WILDCARD_PERMISSION));
        assert!(!catalog.is_known("team_management"));
    }

    #[test]
    fn test_describe_splits_known_and_unknown() {
        let catalog = PermissionCatalog::standard();
        let role: Role = serde_json::from_value(serde_json::json!({
            "id": "2",
            "name": "مدير المشاريع",
            "permissions": ["project_management", "team_management", "all"]
        }))
        .unwrap();

        let description = catalog.describe(&role);
        assert_eq!(description.known.len(), 1);
        assert_eq!(description.known[0].id, "project_management");
        assert_eq!(description.unknown, vec!["team_management"]);
        assert!(description.wildcard);
    }
}
