//! Headline numbers for the finance overview.

use serde::Serialize;

use crate::budget::BudgetTotals;
use crate::types::*;

/// Totals shown above the finance tabs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinanceSummary {
    pub budgets: BudgetTotals,
    /// Spent share of the combined budget total
    pub spent_percent: f64,
    pub pending_expenses: usize,
    pub active_contracts: usize,
    pub total_contract_value: f64,
    pub invoiced_amount: f64,
    pub paid_amount: f64,
}

impl FinanceSummary {
    pub fn compute(
        budgets: &[Budget],
        expenses: &[Expense],
        contracts: &[Contract],
        invoices: &[Invoice],
    ) -> Self {
        let totals = BudgetTotals::compute(budgets);
        let summary = Self {
            spent_percent: totals.spent_percent(),
            budgets: totals,
            pending_expenses: expenses
                .iter()
                .filter(|e| e.status == ExpenseStatus::Pending)
                .count(),
            active_contracts: contracts
                .iter()
                .filter(|c| c.status == ContractStatus::Active)
                .count(),
            total_contract_value: contracts.iter().map(|c| c.value).sum(),
            invoiced_amount: invoices.iter().map(|i| i.amount).sum(),
            paid_amount: invoices
                .iter()
                .filter(|i| i.status == InvoiceStatus::Paid)
                .map(|i| i.amount)
                .sum(),
        };

        tracing::debug!(
            budgets = budgets.len(),
            contracts = contracts.len(),
            spent_percent = summary.spent_percent,
            "Computed finance summary"
        );
        summary
    }

    /// Invoiced but not yet paid.
    pub fn outstanding_amount(&self) -> f64 {
        self.invoiced_amount - self.paid_amount
    }
}
