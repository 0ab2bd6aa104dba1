//! Projects and tasks for the project-management dashboard
//!
//! # Key Components
//!
//! - [`Project`] / [`Task`]: The records shown on the projects and tasks pages
//! - [`aggregate`]: Derived numbers (remaining budget, duration, completion)
//! - [`ProjectFilter`]: Search term, status and type filtering
//!
//! Percentages computed here treat an empty denominator as 0%; see
//! [`aggregate::percent`].
//!
//! # Example
//!
//! ```ignore
//! use portfolio::{aggregate, ProjectFilter, ProjectStatus};
//!
//! let active = ProjectFilter::new().with_status(ProjectStatus::Active);
//! for project in active.apply(&projects) {
//!     println!("{}: {} days", project.name, aggregate::duration_days(project));
//! }
//! ```

pub mod aggregate;
pub mod filter;
pub mod types;

// Re-export main types
pub use aggregate::{percent, PortfolioTotals};
pub use filter::{ProjectFilter, Selection, ALL};
pub use types::*;
