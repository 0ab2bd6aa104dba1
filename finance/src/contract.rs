//! Contract milestone aggregation.

use portfolio::{percent, StageStatus};

use crate::types::*;

/// Share of milestones completed; 0 for a contract with no milestones.
pub fn contract_completion(contract: &Contract) -> f64 {
    let completed = contract
        .milestones
        .iter()
        .filter(|m| m.status == StageStatus::Completed)
        .count();
    percent(completed as f64, contract.milestones.len() as f64)
}

/// The milestone to show as "next".
///
/// The first in-progress milestone wins, otherwise the first pending one.
/// Selection is by status and position only; due dates play no part.
pub fn next_milestone(contract: &Contract) -> Option<&ContractMilestone> {
    let first_with = |status| contract.milestones.iter().find(|m| m.status == status);
    first_with(StageStatus::InProgress).or_else(|| first_with(StageStatus::Pending))
}

/// Sum of completed milestone amounts.
pub fn contract_earned_amount(contract: &Contract) -> f64 {
    contract
        .milestones
        .iter()
        .filter(|m| m.status == StageStatus::Completed)
        .map(|m| m.amount)
        .sum()
}

/// Sum of paid invoices issued against the contract.
pub fn contract_paid_amount(contract: &Contract, invoices: &[Invoice]) -> f64 {
    invoices
        .iter()
        .filter(|i| i.contract_id == contract.id && i.status == InvoiceStatus::Paid)
        .map(|i| i.amount)
        .sum()
}

/// Invoices issued against the contract, in input order.
pub fn invoices_for<'a>(
    contract: &'a Contract,
    invoices: &'a [Invoice],
) -> impl Iterator<Item = &'a Invoice> + 'a {
    invoices.iter().filter(move |i| i.contract_id == contract.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(stages: &[(&str, f64, StageStatus, &str)]) -> Contract {
        let milestones: Vec<serde_json::Value> = stages
            .iter()
            .map(|(name, amount, status, due)| {
                serde_json::json!({
                    "name": name,
                    "amount": amount,
                    "status": status,
                    "due_date": due,
                })
            })
            .collect();

        serde_json::from_value(serde_json::json!({
            "id": "1",
            "title": "عقد تطوير نظام التعرف على الصور",
            "client": "شركة التقنيات المتقدمة",
            "project_id": "1",
            "contract_type": "development",
            "value": 50000,
            "status": "active",
            "start_date": "2024-01-15",
            "end_date": "2024-06-30",
            "milestones": milestones,
        }))
        .unwrap()
    }

    fn image_recognition() -> Contract {
        contract(&[
            ("جمع البيانات", 12500.0, StageStatus::Completed, "2024-02-15"),
            ("تدريب النموذج", 25000.0, StageStatus::InProgress, "2024-04-30"),
            ("اختبار النشر", 12500.0, StageStatus::Pending, "2024-06-30"),
        ])
    }

    fn invoice(id: &str, contract_id: &str, amount: f64, status: &str) -> Invoice {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "invoice_number": format!("INV-2024-00{}", id),
            "contract_id": contract_id,
            "amount": amount,
            "status": status,
            "issue_date": "2024-02-15",
            "due_date": "2024-03-15",
        }))
        .unwrap()
    }

    #[test]
    fn test_contract_completion() {
        assert!((contract_completion(&image_recognition()) - 33.33).abs() < 0.01);
        assert_eq!(contract_completion(&contract(&[])), 0.0);
    }

    #[test]
    fn test_next_milestone_ignores_due_date() {
        let c = contract(&[
            ("أ", 1.0, StageStatus::Completed, "2024-01-01"),
            ("ب", 1.0, StageStatus::Pending, "2024-02-01"),
            ("ج", 1.0, StageStatus::InProgress, "2024-09-01"),
        ]);
        assert_eq!(next_milestone(&c).map(|m| m.name.as_str()), Some("ج"));

        let c = contract(&[
            ("أ", 1.0, StageStatus::Completed, "2024-01-01"),
            ("ب", 1.0, StageStatus::Pending, "2024-05-01"),
            ("ج", 1.0, StageStatus::Pending, "2024-02-01"),
        ]);
        assert_eq!(next_milestone(&c).map(|m| m.name.as_str()), Some("ب"));

        let done = contract(&[("أ", 1.0, StageStatus::Completed, "2024-01-01")]);
        assert!(next_milestone(&done).is_none());
    }

    #[test]
    fn test_earned_and_paid() {
        let c = image_recognition();
        assert_eq!(contract_earned_amount(&c), 12500.0);

        let invoices = vec![
            invoice("1", "1", 12500.0, "paid"),
            invoice("2", "1", 12500.0, "pending"),
            invoice("3", "2", 15000.0, "paid"),
        ];
        assert_eq!(contract_paid_amount(&c, &invoices), 12500.0);
        assert_eq!(invoices_for(&c, &invoices).count(), 2);
    }
}
