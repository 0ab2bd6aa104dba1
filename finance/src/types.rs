//! Finance records: budgets, expenses, contracts and invoices.

use chrono::NaiveDate;
use portfolio::{string_enum, StageStatus};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Stored and computed remaining budget may differ by this much before it
/// counts as drift.
pub const DRIFT_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    #[default]
    Active,
    Completed,
}

string_enum!(BudgetStatus, "budget status", {
    Active => "active",
    Completed => "completed",
});

/// One spending line within a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct BudgetCategory {
    pub category: String,
    #[serde(default)]
    pub allocated: f64,
    #[serde(default)]
    pub spent: f64,
}

/// A project's budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Budget {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub project_name: String,
    pub total_budget: f64,
    #[serde(default)]
    pub allocated_budget: f64,
    #[serde(default)]
    pub spent_budget: f64,
    /// Value reported by the source. Advisory only; see [`Budget::remaining`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_budget: Option<f64>,
    #[serde(default)]
    pub budget_categories: Vec<BudgetCategory>,
    #[serde(default)]
    pub status: BudgetStatus,
    #[serde(default)]
    pub created_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
}

impl Budget {
    /// `total_budget − spent_budget`. Negative when overspent.
    pub fn remaining(&self) -> f64 {
        self.total_budget - self.spent_budget
    }

    /// Stored minus computed remaining, when the source reported a value that
    /// disagrees with [`remaining`](Self::remaining).
    pub fn remaining_drift(&self) -> Option<f64> {
        let stored = self.remaining_budget?;
        let drift = stored - self.remaining();
        (drift.abs() > DRIFT_TOLERANCE).then_some(drift)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    Recurring,
    OneTime,
}

string_enum!(ExpenseType, "expense type", {
    Recurring => "recurring",
    OneTime => "one_time",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

string_enum!(ExpenseStatus, "expense status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// A single expense claim against a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Expense {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    #[serde(default)]
    pub status: ExpenseStatus,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Development,
    Consulting,
    Maintenance,
    Support,
    Training,
}

string_enum!(ContractType, "contract type", {
    Development => "development",
    Consulting => "consulting",
    Maintenance => "maintenance",
    Support => "support",
    Training => "training",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    #[default]
    Draft,
    Pending,
    Active,
    Completed,
    Cancelled,
    Terminated,
    Expired,
}

string_enum!(ContractStatus, "contract status", {
    Draft => "draft",
    Pending => "pending",
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
    Terminated => "terminated",
    Expired => "expired",
});

/// A billable deliverable within a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ContractMilestone {
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    pub status: StageStatus,
    pub due_date: NaiveDate,
}

/// A client contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Contract {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub contract_type: ContractType,
    pub value: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub status: ContractStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub payment_terms: String,
    #[serde(default)]
    pub milestones: Vec<ContractMilestone>,
    #[serde(default)]
    pub terms_conditions: String,
    #[serde(default)]
    pub signed_date: Option<NaiveDate>,
    #[serde(default)]
    pub contract_manager: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Paid,
    #[default]
    Pending,
    Overdue,
}

string_enum!(InvoiceStatus, "invoice status", {
    Paid => "paid",
    Pending => "pending",
    Overdue => "overdue",
});

/// An invoice issued against a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub contract_id: String,
    #[serde(default)]
    pub client: String,
    pub amount: f64,
    #[serde(default)]
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(total: f64, spent: f64, stored: Option<f64>) -> Budget {
        Budget {
            id: "1".to_string(),
            project_id: "1".to_string(),
            project_name: "نظام التعرف على الصور".to_string(),
            total_budget: total,
            allocated_budget: 45000.0,
            spent_budget: spent,
            remaining_budget: stored,
            budget_categories: Vec::new(),
            status: BudgetStatus::Active,
            created_date: None,
            last_updated: None,
        }
    }

    #[test]
    fn test_remaining_is_computed() {
        let b = budget(50000.0, 37500.0, Some(12500.0));
        assert_eq!(b.remaining(), 12500.0);
        assert_eq!(b.remaining_drift(), None);

        let drifted = budget(50000.0, 37500.0, Some(15000.0));
        assert_eq!(drifted.remaining(), 12500.0);
        assert_eq!(drifted.remaining_drift(), Some(2500.0));

        assert_eq!(budget(50000.0, 0.0, None).remaining_drift(), None);
    }

    #[test]
    fn test_expense_type_field_name() {
        let expense: Expense = serde_json::from_value(serde_json::json!({
            "id": "2",
            "project_id": "1",
            "description": "خادم GPU للتدريب",
            "amount": 2500,
            "category": "الأجهزة",
            "type": "one_time",
            "status": "pending",
            "date": "2024-06-15",
            "submitted_by": "فاطمة علي"
        }))
        .unwrap();

        assert_eq!(expense.expense_type, ExpenseType::OneTime);
        assert_eq!(expense.status, ExpenseStatus::Pending);

        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(value["type"], "one_time");
        assert!(value.get("approved_by").is_none());
    }

    #[test]
    fn test_contract_defaults() {
        let contract: Contract = serde_json::from_value(serde_json::json!({
            "id": "9",
            "title": "عقد صيانة",
            "contract_type": "maintenance",
            "value": 1000,
            "start_date": "2024-01-01",
            "end_date": "2024-12-31"
        }))
        .unwrap();

        assert_eq!(contract.currency, "USD");
        assert_eq!(contract.status, ContractStatus::Draft);
        assert!(contract.milestones.is_empty());
        assert_eq!("terminated".parse::<ContractStatus>().unwrap(), ContractStatus::Terminated);
    }
}
