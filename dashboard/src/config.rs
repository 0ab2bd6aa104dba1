//! Configuration for the dashboard.

use std::path::{Path, PathBuf};

use hierarchy::{OrphanPolicy, TreePolicy};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Role tree rules
    pub roles: RolesConfig,
    /// Finance card settings
    pub finance: FinanceConfig,
    /// General settings
    pub general: GeneralConfig,
}

impl DashboardConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Read the config file at `path`, or fall back to defaults when it does
    /// not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Policy to build role trees with.
    pub fn tree_policy(&self) -> TreePolicy {
        TreePolicy {
            orphan_policy: self.roles.orphan_policy,
            enforce_max_subordinates: self.roles.enforce_max_subordinates,
        }
    }
}

/// Role tree configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    /// What happens to the subroles of a deleted role
    pub orphan_policy: OrphanPolicy,
    /// Refuse to create subroles past a parent's `max_subordinates`
    pub enforce_max_subordinates: bool,
}

impl Default for RolesConfig {
    fn default() -> Self {
        let policy = TreePolicy::default();
        Self {
            orphan_policy: policy.orphan_policy,
            enforce_max_subordinates: policy.enforce_max_subordinates,
        }
    }
}

/// Finance configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceConfig {
    /// Number of spending categories shown per budget card
    pub top_categories: usize,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self { top_categories: 3 }
    }
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level for the dashboard crates
    pub log_level: String,
    /// Dataset file; the built-in sample data is used when unset
    pub data_path: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_path: None,
        }
    }
}
