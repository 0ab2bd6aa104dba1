//! Shared role tree for concurrent callers.
//!
//! Create and delete rewrite `level` and `path` across a subtree, so every
//! mutation takes the tree's write lock for its whole duration.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::tree::{RoleError, RoleTree};
use crate::types::{Role, RoleDraft};

/// A [`RoleTree`] behind a per-tree read/write lock.
#[derive(Debug, Clone, Default)]
pub struct SharedRoleTree {
    inner: Arc<RwLock<RoleTree>>,
}

impl SharedRoleTree {
    pub fn new(tree: RoleTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Create a role and return a copy of it.
    pub async fn create_role(
        &self,
        parent_id: Option<&str>,
        draft: RoleDraft,
    ) -> Result<Role, RoleError> {
        let mut tree = self.inner.write().await;
        tree.create_role(parent_id, draft).cloned()
    }

    /// Delete a role under the tree's orphan policy.
    pub async fn delete_role(&self, id: &str) -> Result<Role, RoleError> {
        let mut tree = self.inner.write().await;
        tree.delete_role(id)
    }

    pub async fn set_permissions(
        &self,
        id: &str,
        permissions: Vec<String>,
    ) -> Result<Role, RoleError> {
        let mut tree = self.inner.write().await;
        tree.set_permissions(id, permissions).cloned()
    }

    pub async fn get(&self, id: &str) -> Option<Role> {
        let tree = self.inner.read().await;
        tree.get(id).cloned()
    }

    /// Copies of the roles matching `term`, in pre-order.
    pub async fn search(&self, term: &str) -> Vec<Role> {
        let tree = self.inner.read().await;
        tree.search(term).cloned().collect()
    }

    /// Run a read-only closure against the current tree.
    pub async fn read<R>(&self, f: impl FnOnce(&RoleTree) -> R) -> R {
        let tree = self.inner.read().await;
        f(&tree)
    }

    /// Clone the whole tree.
    pub async fn snapshot(&self) -> RoleTree {
        self.inner.read().await.clone()
    }
}
