//! Role forest management.
//!
//! A [`RoleTree`] owns every role in the organization. Children live inside
//! their parent's `subroles`, so there are no back-pointers; `level`, `path`
//! and `parent_role_id` are derived from the parent whenever a role is
//! created or moved.

use std::collections::{HashMap, HashSet};
use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::permissions::PermissionCatalog;
use crate::types::*;

/// Separator between segments of [`Role::path`].
pub const PATH_DELIMITER: char = '/';

/// Error types for role tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleError {
    /// Malformed creation input or inconsistent hierarchy data
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Operation would leave the tree in a forbidden state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No role with the given id
    #[error("Role not found: {0}")]
    NotFound(String),

    /// Parent already holds its maximum number of subroles
    #[error("Role {parent} already has the maximum of {limit} subroles")]
    SubordinateLimit { parent: String, limit: u32 },
}

/// What happens to the subroles of a deleted role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Move subroles up to the deleted role's parent, in place
    #[default]
    Reparent,
    /// Remove the whole subtree
    Cascade,
    /// Refuse to delete roles that still have subroles
    Reject,
}

/// Rules applied by mutating tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreePolicy {
    pub orphan_policy: OrphanPolicy,
    /// Reject creation when the parent's `max_subordinates` is reached
    pub enforce_max_subordinates: bool,
}

impl Default for TreePolicy {
    fn default() -> Self {
        Self {
            orphan_policy: OrphanPolicy::Reparent,
            enforce_max_subordinates: true,
        }
    }
}

/// A forest of roles.
#[derive(Debug, Clone, Default)]
pub struct RoleTree {
    roots: Vec<Role>,
    policy: TreePolicy,
    catalog: PermissionCatalog,
}

/// A role together with its ancestors and descendants.
#[derive(Debug)]
pub struct RoleLineage<'a> {
    /// Ancestors, root first
    pub ancestors: Vec<&'a Role>,
    pub role: &'a Role,
    /// Direct subroles (each carrying its own subtree)
    pub descendants: &'a [Role],
}

impl RoleTree {
    /// Create an empty forest with default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an already nested forest, validating its invariants.
    pub fn from_roots(roots: Vec<Role>) -> Result<Self, RoleError> {
        let tree = Self {
            roots,
            ..Default::default()
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Assemble a forest from flat records linked by `parent_role_id`.
    ///
    /// Children are attached in input order. Records must not carry nested
    /// subroles, and every parent reference must resolve. Stored `level` and
    /// `path` are ignored and re-derived; names are checked as in
    /// [`RoleTree::create_role`].
    pub fn from_records(records: Vec<Role>) -> Result<Self, RoleError> {
        let total = records.len();
        let mut ids: HashSet<String> = HashSet::with_capacity(total);
        for record in &records {
            if record.has_subroles() {
                return Err(RoleError::Validation(format!(
                    "flat record {} must not contain subroles",
                    record.id
                )));
            }
            if !ids.insert(record.id.clone()) {
                return Err(RoleError::Validation(format!(
                    "duplicate role id: {}",
                    record.id
                )));
            }
        }

        let mut roots: Vec<Role> = Vec::new();
        let mut children: HashMap<String, Vec<Role>> = HashMap::new();
        for record in records {
            match record.parent_role_id.clone() {
                None => roots.push(record),
                Some(parent) if ids.contains(&parent) => {
                    children.entry(parent).or_default().push(record)
                }
                Some(parent) => {
                    return Err(RoleError::Validation(format!(
                        "role {} references unknown parent {}",
                        record.id, parent
                    )))
                }
            }
        }

        fn attach(role: &mut Role, children: &mut HashMap<String, Vec<Role>>) {
            if let Some(mut subroles) = children.remove(&role.id) {
                for child in &mut subroles {
                    attach(child, children);
                }
                role.subroles = subroles;
            }
        }

        for root in &mut roots {
            attach(root, &mut children);
        }

        // Anything left over sits on a parent cycle unreachable from a root.
        if !children.is_empty() {
            let mut stranded: Vec<&str> = children.keys().map(String::as_str).collect();
            stranded.sort_unstable();
            return Err(RoleError::Validation(format!(
                "roles form a cycle through: {}",
                stranded.join(", ")
            )));
        }

        let mut tree = Self {
            roots,
            ..Default::default()
        };
        for root in &mut tree.roots {
            rebase(root, None);
        }
        tree.validate()?;
        Ok(tree)
    }

    /// Builder: set the mutation policy.
    pub fn with_policy(mut self, policy: TreePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder: validate permission edits against a custom catalog.
    pub fn with_catalog(mut self, catalog: PermissionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn policy(&self) -> TreePolicy {
        self.policy
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Top-level roles in display order.
    pub fn roots(&self) -> &[Role] {
        &self.roots
    }

    /// Total number of roles in the forest.
    pub fn len(&self) -> usize {
        self.flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Look up a role anywhere in the forest.
    pub fn get(&self, id: &str) -> Option<&Role> {
        self.flatten().find(|role| role.id == id)
    }

    /// Pre-order traversal of every role: parents before children,
    /// siblings in their original order.
    pub fn flatten(&self) -> Flatten<'_> {
        Flatten::over(&self.roots)
    }

    /// Roles whose name or description contains `term`, in pre-order.
    pub fn search<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a Role> + 'a {
        self.flatten().filter(move |role| role.matches(term))
    }

    /// Roles at a given depth.
    pub fn with_level(&self, level: u32) -> impl Iterator<Item = &Role> + '_ {
        self.flatten().filter(move |role| role.level == level)
    }

    /// Direct children of `parent`, or the roots when `parent` is `None`.
    pub fn children_of(&self, parent: Option<&str>) -> &[Role] {
        match parent {
            None => &self.roots,
            Some(id) => self
                .get(id)
                .map(|role| role.subroles.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Ancestors, the role itself, and its descendants.
    pub fn hierarchy(&self, id: &str) -> Option<RoleLineage<'_>> {
        let trail = self.locate(id)?;
        let mut ancestors = Vec::with_capacity(trail.len());
        let mut level = self.roots.as_slice();
        let mut role = None;

        for (depth, index) in trail.iter().enumerate() {
            let node = level.get(*index)?;
            if depth + 1 == trail.len() {
                role = Some(node);
            } else {
                ancestors.push(node);
            }
            level = &node.subroles;
        }

        let role = role?;
        Some(RoleLineage {
            ancestors,
            role,
            descendants: &role.subroles,
        })
    }

    /// Create a role under `parent_id`, or as a new root.
    ///
    /// `level` and `path` are derived from the parent. Fails when the name is
    /// empty or contains the path delimiter, the id is taken, the parent does
    /// not exist, a permission id is unknown, or the parent is full.
    pub fn create_role(
        &mut self,
        parent_id: Option<&str>,
        draft: RoleDraft,
    ) -> Result<&Role, RoleError> {
        let name = draft.name.trim().to_string();
        if let Some(reason) = name_error(&name) {
            return Err(RoleError::Validation(reason));
        }

        let id = match draft.id {
            Some(id) if id.trim().is_empty() => {
                return Err(RoleError::Validation("role id must not be blank".to_string()))
            }
            Some(id) => id,
            None => uuid::Uuid::new_v4().to_string(),
        };
        if self.get(&id).is_some() {
            return Err(RoleError::Validation(format!("duplicate role id: {}", id)));
        }

        if let Some(unknown) = draft
            .permissions
            .iter()
            .find(|permission| !self.catalog.is_known(permission))
        {
            return Err(RoleError::Validation(format!(
                "unknown permission: {}",
                unknown
            )));
        }

        let mut role = Role {
            id,
            name,
            description: draft.description,
            level: 0,
            path: String::new(),
            parent_role_id: None,
            permissions: dedup_permissions(draft.permissions),
            capabilities: draft.capabilities,
            max_subordinates: draft.max_subordinates,
            assigned_users: 0,
            subroles: Vec::new(),
        };

        let Some(parent_id) = parent_id else {
            rebase(&mut role, None);
            tracing::debug!(role_id = %role.id, path = %role.path, "Created root role");
            let index = self.roots.len();
            self.roots.push(role);
            return Ok(&self.roots[index]);
        };

        let trail = self
            .locate(parent_id)
            .ok_or_else(|| RoleError::Validation(format!("parent role not found: {}", parent_id)))?;
        let enforce = self.policy.enforce_max_subordinates;
        let parent = self
            .node_mut(&trail)
            .ok_or_else(|| RoleError::NotFound(parent_id.to_string()))?;

        if enforce && !parent.has_capacity() {
            return Err(RoleError::SubordinateLimit {
                parent: parent.id.clone(),
                limit: parent.max_subordinates,
            });
        }

        rebase(&mut role, Some(Anchor::of(parent)));
        tracing::debug!(
            role_id = %role.id,
            parent_id = %parent.id,
            path = %role.path,
            "Created subrole"
        );

        let index = parent.subroles.len();
        parent.subroles.push(role);
        Ok(&parent.subroles[index])
    }

    /// Delete a role according to the tree's [`OrphanPolicy`].
    ///
    /// Roles with assigned users are never deleted. Returns the removed role;
    /// under [`OrphanPolicy::Reparent`] its `subroles` are empty because they
    /// were moved to the grandparent.
    pub fn delete_role(&mut self, id: &str) -> Result<Role, RoleError> {
        let trail = self
            .locate(id)
            .ok_or_else(|| RoleError::NotFound(id.to_string()))?;
        let role = self
            .node(&trail)
            .ok_or_else(|| RoleError::NotFound(id.to_string()))?;

        if role.assigned_users > 0 {
            return Err(RoleError::Conflict(format!(
                "cannot delete role {} with {} assigned users",
                id, role.assigned_users
            )));
        }

        let policy = self.policy.orphan_policy;
        match policy {
            OrphanPolicy::Reject if role.has_subroles() => {
                return Err(RoleError::Conflict(format!(
                    "cannot delete role {} with subroles",
                    id
                )));
            }
            OrphanPolicy::Cascade => {
                if let Some(busy) = Flatten::over(&role.subroles).find(|r| r.assigned_users > 0) {
                    return Err(RoleError::Conflict(format!(
                        "cannot delete role {}: descendant {} has {} assigned users",
                        id, busy.id, busy.assigned_users
                    )));
                }
            }
            _ => {}
        }

        let Some((&index, parent_trail)) = trail.split_last() else {
            return Err(RoleError::NotFound(id.to_string()));
        };

        let new_parent: Option<ParentSlot> = if parent_trail.is_empty() {
            None
        } else {
            self.node(parent_trail).map(ParentSlot::of)
        };

        let siblings = self
            .siblings_mut(parent_trail)
            .ok_or_else(|| RoleError::NotFound(id.to_string()))?;
        let mut removed = siblings.remove(index);

        if policy == OrphanPolicy::Reparent && removed.has_subroles() {
            let mut orphans = std::mem::take(&mut removed.subroles);
            for orphan in &mut orphans {
                rebase(orphan, new_parent.as_ref().map(ParentSlot::anchor));
            }
            let moved = orphans.len();
            siblings.splice(index..index, orphans);

            if let Some(parent) = &new_parent {
                if parent.max_subordinates > 0 && siblings.len() > parent.max_subordinates as usize {
                    tracing::warn!(
                        parent_id = %parent.id,
                        limit = parent.max_subordinates,
                        subroles = siblings.len(),
                        "Reparenting exceeded max_subordinates"
                    );
                }
            }
            tracing::debug!(role_id = %id, moved, "Reparented subroles of deleted role");
        }

        tracing::debug!(role_id = %id, policy = ?policy, "Deleted role");
        Ok(removed)
    }

    /// Replace a role's permission list.
    pub fn set_permissions(
        &mut self,
        id: &str,
        permissions: Vec<String>,
    ) -> Result<&Role, RoleError> {
        if let Some(unknown) = permissions.iter().find(|p| !self.catalog.is_known(p)) {
            return Err(RoleError::Validation(format!(
                "unknown permission: {}",
                unknown
            )));
        }

        let role = self.find_mut(id)?;
        role.permissions = dedup_permissions(permissions);
        tracing::debug!(role_id = %id, count = role.permissions.len(), "Updated permissions");
        Ok(role)
    }

    /// Record `count` additional users holding the role.
    pub fn assign_users(&mut self, id: &str, count: u32) -> Result<&Role, RoleError> {
        let role = self.find_mut(id)?;
        role.assigned_users = role.assigned_users.checked_add(count).ok_or_else(|| {
            RoleError::Validation(format!("assigned user count overflow on role {}", id))
        })?;
        tracing::debug!(role_id = %id, assigned = role.assigned_users, "Assigned users");
        Ok(role)
    }

    /// Record `count` users releasing the role.
    pub fn unassign_users(&mut self, id: &str, count: u32) -> Result<&Role, RoleError> {
        let role = self.find_mut(id)?;
        let current = role.assigned_users;
        role.assigned_users = current.checked_sub(count).ok_or_else(|| {
            RoleError::Validation(format!(
                "role {} has only {} assigned users",
                id, current
            ))
        })?;
        tracing::debug!(role_id = %id, assigned = role.assigned_users, "Unassigned users");
        Ok(role)
    }

    /// Check names, id uniqueness, and that `level`, `path` and
    /// `parent_role_id` agree with each role's position.
    pub fn validate(&self) -> Result<(), RoleError> {
        fn check<'a>(
            roles: &'a [Role],
            parent: Option<Anchor<'a>>,
            seen: &mut HashSet<&'a str>,
        ) -> Result<(), RoleError> {
            for role in roles {
                if let Some(reason) = name_error(&role.name) {
                    return Err(RoleError::Validation(format!("role {}: {}", role.id, reason)));
                }
                if !seen.insert(role.id.as_str()) {
                    return Err(RoleError::Validation(format!(
                        "duplicate role id: {}",
                        role.id
                    )));
                }

                let (level, path, parent_id) = expected_position(&role.name, parent);
                if role.level != level {
                    return Err(RoleError::Validation(format!(
                        "role {} has level {}, expected {}",
                        role.id, role.level, level
                    )));
                }
                if role.path != path {
                    return Err(RoleError::Validation(format!(
                        "role {} has path {:?}, expected {:?}",
                        role.id, role.path, path
                    )));
                }
                if role.parent_role_id.as_deref() != parent_id {
                    return Err(RoleError::Validation(format!(
                        "role {} has parent {:?}, expected {:?}",
                        role.id, role.parent_role_id, parent_id
                    )));
                }

                check(&role.subroles, Some(Anchor::of(role)), seen)?;
            }
            Ok(())
        }

        let mut seen = HashSet::new();
        check(&self.roots, None, &mut seen)
    }

    /// Index trail from the roots down to the role with `id`.
    fn locate(&self, id: &str) -> Option<Vec<usize>> {
        fn walk(roles: &[Role], id: &str, trail: &mut Vec<usize>) -> bool {
            for (index, role) in roles.iter().enumerate() {
                trail.push(index);
                if role.id == id || walk(&role.subroles, id, trail) {
                    return true;
                }
                trail.pop();
            }
            false
        }

        let mut trail = Vec::new();
        walk(&self.roots, id, &mut trail).then_some(trail)
    }

    fn node(&self, trail: &[usize]) -> Option<&Role> {
        let (first, rest) = trail.split_first()?;
        let mut node = self.roots.get(*first)?;
        for index in rest {
            node = node.subroles.get(*index)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, trail: &[usize]) -> Option<&mut Role> {
        let (first, rest) = trail.split_first()?;
        let mut node = self.roots.get_mut(*first)?;
        for index in rest {
            node = node.subroles.get_mut(*index)?;
        }
        Some(node)
    }

    fn siblings_mut(&mut self, parent_trail: &[usize]) -> Option<&mut Vec<Role>> {
        if parent_trail.is_empty() {
            Some(&mut self.roots)
        } else {
            self.node_mut(parent_trail).map(|parent| &mut parent.subroles)
        }
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Role, RoleError> {
        let trail = self
            .locate(id)
            .ok_or_else(|| RoleError::NotFound(id.to_string()))?;
        self.node_mut(&trail)
            .ok_or_else(|| RoleError::NotFound(id.to_string()))
    }
}

/// Why `name` cannot be used as a role name, if it cannot.
fn name_error(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        Some("role name is required".to_string())
    } else if name.contains(PATH_DELIMITER) {
        Some(format!(
            "role name must not contain '{}': {}",
            PATH_DELIMITER, name
        ))
    } else {
        None
    }
}

/// The parts of a parent that a subrole's position derives from.
#[derive(Debug, Clone, Copy)]
struct Anchor<'a> {
    id: &'a str,
    level: u32,
    path: &'a str,
}

impl<'a> Anchor<'a> {
    fn of(role: &'a Role) -> Self {
        Self {
            id: &role.id,
            level: role.level,
            path: &role.path,
        }
    }
}

/// Owned parent details kept across a removal from the tree.
#[derive(Debug)]
struct ParentSlot {
    id: String,
    level: u32,
    path: String,
    max_subordinates: u32,
}

impl ParentSlot {
    fn of(role: &Role) -> Self {
        Self {
            id: role.id.clone(),
            level: role.level,
            path: role.path.clone(),
            max_subordinates: role.max_subordinates,
        }
    }

    fn anchor(&self) -> Anchor<'_> {
        Anchor {
            id: &self.id,
            level: self.level,
            path: &self.path,
        }
    }
}

/// Level, path and parent id a role named `name` must have under `parent`.
fn expected_position<'a>(name: &str, parent: Option<Anchor<'a>>) -> (u32, String, Option<&'a str>) {
    match parent {
        None => (0, format!("{}{}", PATH_DELIMITER, name), None),
        Some(parent) => (
            parent.level + 1,
            format!("{}{}{}", parent.path, PATH_DELIMITER, name),
            Some(parent.id),
        ),
    }
}

/// Re-derive `level`, `path` and `parent_role_id` for a subtree placed under `parent`.
fn rebase(role: &mut Role, parent: Option<Anchor<'_>>) {
    let (level, path, parent_id) = expected_position(&role.name, parent);
    role.level = level;
    role.path = path;
    role.parent_role_id = parent_id.map(str::to_string);

    let mut subroles = std::mem::take(&mut role.subroles);
    for child in &mut subroles {
        rebase(child, Some(Anchor::of(role)));
    }
    role.subroles = subroles;
}

/// Lazy pre-order iterator over a slice of roles and their subtrees.
///
/// Cloning the iterator (or calling [`RoleTree::flatten`] again) restarts
/// the traversal.
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    stack: Vec<std::slice::Iter<'a, Role>>,
}

impl<'a> Flatten<'a> {
    /// Traverse `roles` and everything beneath them.
    pub fn over(roles: &'a [Role]) -> Self {
        Self {
            stack: vec![roles.iter()],
        }
    }
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a Role;

    fn next(&mut self) -> Option<&'a Role> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(role) => {
                    if role.has_subroles() {
                        self.stack.push(role.subroles.iter());
                    }
                    return Some(role);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl FusedIterator for Flatten<'_> {}
