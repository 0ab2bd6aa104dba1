//! Rendering contract for the role tree.
//!
//! The presentation layer draws one card per [`RenderRow`]. Nodes start
//! expanded; collapsing a node hides its subtree. While a search term is
//! active the matches are listed flat at indent 0, whatever their depth.

use std::collections::HashSet;

use crate::tree::RoleTree;
use crate::types::Role;

/// Number of permission badges a role card shows before "+N more".
pub const DEFAULT_BADGE_LIMIT: usize = 5;

/// One visible line of the role tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRow<'a> {
    pub role: &'a Role,
    /// Indentation level
    pub indent: u32,
    /// Whether the node's subtree is shown
    pub expanded: bool,
    /// Whether the node has a toggle at all
    pub has_children: bool,
}

/// Per-view state: which nodes are collapsed and the active search term.
#[derive(Debug, Clone, Default)]
pub struct RoleTreeView {
    collapsed: HashSet<String>,
    search_term: String,
}

impl RoleTreeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn clear_search(&mut self) {
        self.search_term.clear();
    }

    pub fn is_searching(&self) -> bool {
        !self.search_term.is_empty()
    }

    pub fn is_expanded(&self, role_id: &str) -> bool {
        !self.collapsed.contains(role_id)
    }

    /// Flip a node between expanded and collapsed. Returns the new state.
    pub fn toggle(&mut self, role_id: &str) -> bool {
        if self.collapsed.remove(role_id) {
            true
        } else {
            self.collapsed.insert(role_id.to_string());
            false
        }
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    /// Visible rows for `tree` under the current view state.
    pub fn rows<'a>(&self, tree: &'a RoleTree) -> Vec<RenderRow<'a>> {
        if self.is_searching() {
            return tree
                .flatten()
                .filter(|role| role.matches(&self.search_term))
                .map(|role| RenderRow {
                    role,
                    indent: 0,
                    expanded: self.is_expanded(&role.id),
                    has_children: role.has_subroles(),
                })
                .collect();
        }

        let mut rows = Vec::new();
        self.push_rows(tree.roots(), &mut rows);
        rows
    }

    fn push_rows<'a>(&self, roles: &'a [Role], rows: &mut Vec<RenderRow<'a>>) {
        for role in roles {
            let expanded = self.is_expanded(&role.id);
            rows.push(RenderRow {
                role,
                indent: role.level,
                expanded,
                has_children: role.has_subroles(),
            });
            if expanded {
                self.push_rows(&role.subroles, rows);
            }
        }
    }
}

/// Permission ids shown on a role card plus the hidden remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionBadges<'a> {
    pub shown: &'a [String],
    pub overflow: usize,
}

/// First `limit` permission ids of a role and how many more it holds.
pub fn permission_badges(role: &Role, limit: usize) -> PermissionBadges<'_> {
    let shown = &role.permissions[..role.permissions.len().min(limit)];
    PermissionBadges {
        shown,
        overflow: role.permissions.len() - shown.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoleDraft;

    fn tree() -> RoleTree {
        let mut tree = RoleTree::new();
        tree.create_role(None, RoleDraft::new("Director").with_id("1"))
            .unwrap();
        tree.create_role(Some("1"), RoleDraft::new("Project Manager").with_id("2"))
            .unwrap();
        tree.create_role(Some("2"), RoleDraft::new("Team Lead").with_id("3"))
            .unwrap();
        tree.create_role(Some("1"), RoleDraft::new("HR Manager").with_id("4"))
            .unwrap();
        tree
    }

    fn layout<'a>(rows: &[RenderRow<'a>]) -> Vec<(&'a str, u32)> {
        rows.iter().map(|r| (r.role.id.as_str(), r.indent)).collect()
    }

    #[test]
    fn test_rows_default_expanded() {
        let tree = tree();
        let view = RoleTreeView::new();

        let rows = view.rows(&tree);
        assert_eq!(layout(&rows), vec![("1", 0), ("2", 1), ("3", 2), ("4", 1)]);
        assert!(rows[0].has_children);
        assert!(!rows[2].has_children);
    }

    #[test]
    fn test_collapse_hides_subtree() {
        let tree = tree();
        let mut view = RoleTreeView::new();

        assert!(!view.toggle("2"));
        assert_eq!(layout(&view.rows(&tree)), vec![("1", 0), ("2", 1), ("4", 1)]);

        assert!(view.toggle("2"));
        assert_eq!(view.rows(&tree).len(), 4);
    }

    #[test]
    fn test_search_rows_are_flat() {
        let tree = tree();
        let mut view = RoleTreeView::new();
        view.set_search_term("Manager");

        assert_eq!(layout(&view.rows(&tree)), vec![("2", 0), ("4", 0)]);

        view.clear_search();
        assert!(!view.is_searching());
        assert_eq!(view.rows(&tree).len(), 4);
    }

    #[test]
    fn test_permission_badges_overflow() {
        let mut tree = RoleTree::new();
        let role = tree
            .create_role(
                None,
                RoleDraft::new("Admin").with_permissions([
                    "project_management",
                    "task_management",
                    "user_management",
                    "role_management",
                    "budget_management",
                    "report_viewing",
                    "hr_management",
                ]),
            )
            .unwrap();

        let badges = permission_badges(role, DEFAULT_BADGE_LIMIT);
        assert_eq!(badges.shown.len(), 5);
        assert_eq!(badges.overflow, 2);

        let badges = permission_badges(role, 10);
        assert_eq!(badges.shown.len(), 7);
        assert_eq!(badges.overflow, 0);
    }
}
