//! Budget aggregation.
//!
//! Pure functions over [`Budget`] records. Utilization is measured against the
//! allocated amount, remaining against the total.

use portfolio::percent;
use serde::Serialize;

use crate::types::*;

/// `spent_budget / allocated_budget × 100`; 0 when nothing is allocated.
pub fn utilization_percent(budget: &Budget) -> f64 {
    percent(budget.spent_budget, budget.allocated_budget)
}

/// Spent more than allocated.
pub fn is_over_budget(budget: &Budget) -> bool {
    budget.spent_budget > budget.allocated_budget
}

/// Amount spent beyond the allocation, or 0.
pub fn overage(budget: &Budget) -> f64 {
    (budget.spent_budget - budget.allocated_budget).max(0.0)
}

/// The `n` categories with the highest spend, highest first.
///
/// Equal spends keep their original relative order.
pub fn top_categories(budget: &Budget, n: usize) -> Vec<&BudgetCategory> {
    let mut categories: Vec<&BudgetCategory> = budget.budget_categories.iter().collect();
    categories.sort_by(|a, b| b.spent.total_cmp(&a.spent));
    categories.truncate(n);
    categories
}

/// Sums across a set of budgets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetTotals {
    pub total_budget: f64,
    pub spent_budget: f64,
    /// Sum of computed [`Budget::remaining`]
    pub remaining_budget: f64,
}

impl BudgetTotals {
    pub fn compute(budgets: &[Budget]) -> Self {
        budgets.iter().fold(Self::default(), |mut acc, budget| {
            acc.total_budget += budget.total_budget;
            acc.spent_budget += budget.spent_budget;
            acc.remaining_budget += budget.remaining();
            acc
        })
    }

    /// Spent share of the combined total.
    pub fn spent_percent(&self) -> f64 {
        percent(self.spent_budget, self.total_budget)
    }
}

/// Shorthand for [`BudgetTotals::compute`].
pub fn totals(budgets: &[Budget]) -> BudgetTotals {
    BudgetTotals::compute(budgets)
}
