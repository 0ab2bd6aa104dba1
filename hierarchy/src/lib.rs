//! Role Hierarchy for the project-management dashboard
//!
//! This crate models the organization as a forest of roles:
//!
//! - **Roots**: top-level roles at level 0, path `/<name>`
//! - **Subroles**: owned by their parent, level `parent + 1`, path `<parent path>/<name>`
//!
//! # Key Components
//!
//! - [`RoleTree`]: The forest, with create/delete/search/flatten operations
//! - [`PermissionCatalog`]: Static permission reference data
//! - [`RoleTreeView`]: Expand/collapse and search state for rendering
//! - [`SharedRoleTree`]: Lock-guarded tree for concurrent callers
//!
//! # Example
//!
//! ```ignore
//! use hierarchy::{RoleDraft, RoleTree};
//!
//! let mut tree = RoleTree::new();
//! tree.create_role(None, RoleDraft::new("CEO").with_id("ceo"))?;
//! tree.create_role(Some("ceo"), RoleDraft::new("CTO"))?;
//!
//! let matches: Vec<_> = tree.search("CTO").collect();
//! ```

pub mod permissions;
pub mod render;
pub mod shared;
pub mod tree;
pub mod types;

// Re-export main types
pub use permissions::{PermissionCatalog, PermissionDescription, WILDCARD_PERMISSION};
pub use render::{permission_badges, PermissionBadges, RenderRow, RoleTreeView, DEFAULT_BADGE_LIMIT};
pub use shared::SharedRoleTree;
pub use tree::{Flatten, OrphanPolicy, RoleError, RoleLineage, RoleTree, TreePolicy, PATH_DELIMITER};
pub use types::*;
