//! Project-management dashboard
//!
//! Loads the organisation's roles, projects, tasks and finance records from a
//! [`DataSource`], validates them at the boundary, and derives the figures the
//! presentation layer shows.
//!
//! # Key Components
//!
//! - [`Dataset`]: The record set, parsed from JSON or YAML and validated
//! - [`DataSource`]: Async supplier of datasets ([`FileSource`], [`StaticSource`])
//! - [`Dashboard`]: View-model with overview, role rows and project/budget/contract cards
//! - [`DashboardConfig`]: YAML configuration
//!
//! # Example
//!
//! ```ignore
//! use dashboard::{Dashboard, DashboardConfig, DataSource, FileSource};
//!
//! let source = FileSource::new("data.json")?;
//! let dashboard = Dashboard::new(source.load().await?, &DashboardConfig::default())?;
//! println!("{:?}", dashboard.overview());
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod source;
pub mod view;

// Re-export main types
pub use config::{DashboardConfig, FinanceConfig, GeneralConfig, RolesConfig};
pub use dataset::{Dataset, Format};
pub use error::{DashboardError, Result};
pub use source::{DataSource, FileSource, StaticSource};
pub use view::{BudgetCard, ContractCard, Dashboard, Overview, ProjectCard, RoleRow};
