//! Finance for the project-management dashboard
//!
//! Budgets, expenses, contracts and invoices, plus the arithmetic behind the
//! finance cards.
//!
//! # Key Components
//!
//! - [`budget`]: Utilization, overage, top spending categories, totals
//! - [`contract`]: Milestone completion, next milestone, earned and paid amounts
//! - [`FinanceSummary`]: The overview numbers
//!
//! [`Budget::remaining`] is computed from `total_budget − spent_budget`; a
//! `remaining_budget` carried by the source is kept for reporting only.

pub mod budget;
pub mod contract;
pub mod summary;
pub mod types;

// Re-export main types
pub use budget::{is_over_budget, top_categories, totals, utilization_percent, BudgetTotals};
pub use contract::{contract_completion, next_milestone};
pub use summary::FinanceSummary;
pub use types::*;
