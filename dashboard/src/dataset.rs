//! The record set behind the dashboard, and its boundary validation.
//!
//! Records arrive as plain JSON or YAML. Parsing enforces shape; [`Dataset::validate`]
//! enforces the invariants the aggregators rely on. Anomalies that do not break
//! an invariant (stored remaining budget drifting from the computed one,
//! dangling references, permissions missing from the catalog) are logged and
//! accepted.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use finance::{Budget, Contract, Expense, Invoice};
use hierarchy::{PermissionCatalog, Role, RoleTree, TreePolicy};
use portfolio::{Project, Task};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

const SAMPLE: &str = include_str!("../data/sample.json");

/// Serialization format of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Every collection the dashboard renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    /// Either a nested forest or flat records linked by `parent_role_id`
    pub roles: Vec<Role>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub budgets: Vec<Budget>,
    pub expenses: Vec<Expense>,
    pub contracts: Vec<Contract>,
    pub invoices: Vec<Invoice>,
}

impl Dataset {
    /// Parse and validate.
    pub fn parse(text: &str, format: Format) -> Result<Self> {
        let dataset: Self = match format {
            Format::Json => serde_json::from_str(text)
                .map_err(|e| DashboardError::schema("malformed records", e))?,
            Format::Yaml => serde_yaml::from_str(text)
                .map_err(|e| DashboardError::schema("malformed records", e))?,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::parse(text, Format::Json)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Self::parse(text, Format::Yaml)
    }

    /// The built-in sample organisation, projects and finances.
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE)
    }

    /// Build the role forest under `policy`.
    ///
    /// Top-level records that carry `subroles` mark the input as an already
    /// nested forest; otherwise the roles are flat records linked by
    /// `parent_role_id`, with `level` and `path` derived on load.
    pub fn role_tree(&self, policy: TreePolicy) -> Result<RoleTree> {
        let nested = self.roles.iter().any(Role::has_subroles);
        let tree = if nested {
            RoleTree::from_roots(self.roles.clone())
        } else {
            RoleTree::from_records(self.roles.clone())
        }
        .map_err(|e| DashboardError::schema("roles", e))?;
        Ok(tree.with_policy(policy))
    }

    /// Check every invariant the aggregators rely on.
    pub fn validate(&self) -> Result<()> {
        let tree = self.role_tree(TreePolicy::default())?;
        warn_unknown_permissions(&tree, &PermissionCatalog::standard());

        unique_ids("project", self.projects.iter().map(|p| p.id.as_str()))?;
        for project in &self.projects {
            let ctx = format!("project {}", project.id);
            check_progress(&ctx, project.progress)?;
            check_amount(&ctx, "budget", project.budget)?;
            check_amount(&ctx, "spent_budget", project.spent_budget)?;
            check_dates(&ctx, project.start_date, project.end_date)?;
        }

        unique_ids("task", self.tasks.iter().map(|t| t.id.as_str()))?;
        let project_ids: HashSet<&str> = self.projects.iter().map(|p| p.id.as_str()).collect();
        for task in &self.tasks {
            check_progress(&format!("task {}", task.id), task.progress)?;
            if !project_ids.contains(task.project_id.as_str()) {
                tracing::warn!(task_id = %task.id, project_id = %task.project_id, "Task references unknown project");
            }
        }

        unique_ids("budget", self.budgets.iter().map(|b| b.id.as_str()))?;
        for budget in &self.budgets {
            let ctx = format!("budget {}", budget.id);
            check_amount(&ctx, "total_budget", budget.total_budget)?;
            check_amount(&ctx, "allocated_budget", budget.allocated_budget)?;
            check_amount(&ctx, "spent_budget", budget.spent_budget)?;
            for category in &budget.budget_categories {
                check_amount(&ctx, &category.category, category.allocated)?;
                check_amount(&ctx, &category.category, category.spent)?;
            }
            if let Some(drift) = budget.remaining_drift() {
                tracing::warn!(
                    budget_id = %budget.id,
                    stored = ?budget.remaining_budget,
                    computed = budget.remaining(),
                    drift,
                    "Stored remaining budget disagrees with total minus spent"
                );
            }
        }

        unique_ids("expense", self.expenses.iter().map(|e| e.id.as_str()))?;
        for expense in &self.expenses {
            check_amount(&format!("expense {}", expense.id), "amount", expense.amount)?;
        }

        unique_ids("contract", self.contracts.iter().map(|c| c.id.as_str()))?;
        for contract in &self.contracts {
            let ctx = format!("contract {}", contract.id);
            check_amount(&ctx, "value", contract.value)?;
            check_dates(&ctx, contract.start_date, contract.end_date)?;
            for milestone in &contract.milestones {
                check_amount(&ctx, &milestone.name, milestone.amount)?;
            }
        }

        unique_ids("invoice", self.invoices.iter().map(|i| i.id.as_str()))?;
        let contract_ids: HashSet<&str> = self.contracts.iter().map(|c| c.id.as_str()).collect();
        for invoice in &self.invoices {
            check_amount(&format!("invoice {}", invoice.id), "amount", invoice.amount)?;
            if !contract_ids.contains(invoice.contract_id.as_str()) {
                tracing::warn!(invoice_id = %invoice.id, contract_id = %invoice.contract_id, "Invoice references unknown contract");
            }
        }

        tracing::debug!(
            roles = tree.len(),
            projects = self.projects.len(),
            budgets = self.budgets.len(),
            contracts = self.contracts.len(),
            "Dataset validated"
        );
        Ok(())
    }
}

fn unique_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DashboardError::Schema(format!("duplicate {} id: {}", kind, id)));
        }
    }
    Ok(())
}

fn check_progress(ctx: &str, progress: u8) -> Result<()> {
    if progress > 100 {
        return Err(DashboardError::schema(ctx, format!("progress {} is outside 0-100", progress)));
    }
    Ok(())
}

fn check_amount(ctx: &str, field: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(DashboardError::schema(ctx, format!("{} must be a non-negative amount, got {}", field, amount)));
    }
    Ok(())
}

fn check_dates(ctx: &str, start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(DashboardError::schema(ctx, format!("end date {} is before start date {}", end, start)));
    }
    Ok(())
}

fn warn_unknown_permissions(tree: &RoleTree, catalog: &PermissionCatalog) {
    for role in tree.flatten() {
        let description = catalog.describe(role);
        if !description.unknown.is_empty() {
            tracing::warn!(role_id = %role.id, unknown = ?description.unknown, "Role carries permissions outside the catalog");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_value() -> serde_json::Value {
        serde_json::from_str(SAMPLE).unwrap()
    }

    fn parse_value(value: serde_json::Value) -> Result<Dataset> {
        Dataset::from_json(&value.to_string())
    }

    fn assert_schema_error(result: Result<Dataset>, needle: &str) {
        match result {
            Err(DashboardError::Schema(message)) => {
                assert!(message.contains(needle), "{:?} does not mention {:?}", message, needle)
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_is_valid() {
        let dataset = Dataset::sample().unwrap();
        assert_eq!(dataset.projects.len(), 3);
        assert_eq!(dataset.tasks.len(), 3);
        assert_eq!(dataset.budgets.len(), 2);
        assert_eq!(dataset.contracts.len(), 2);
        assert_eq!(dataset.invoices.len(), 3);

        let tree = dataset.role_tree(TreePolicy::default()).unwrap();
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("data.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("data.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("data.yaml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("data.csv")), None);
        assert_eq!(Format::from_path(Path::new("data")), None);
    }

    #[test]
    fn test_empty_document_is_empty_dataset() {
        assert_eq!(Dataset::from_json("{}").unwrap(), Dataset::default());
    }

    #[test]
    fn test_malformed_record() {
        let mut value = sample_value();
        value["projects"][0]["status"] = "archived".into();
        assert_schema_error(parse_value(value), "malformed records");

        assert_schema_error(Dataset::from_json("[1, 2"), "malformed records");
    }

    #[test]
    fn test_progress_out_of_range() {
        let mut value = sample_value();
        value["projects"][1]["progress"] = 140.into();
        assert_schema_error(parse_value(value), "project 2");

        let mut value = sample_value();
        value["tasks"][0]["progress"] = 101.into();
        assert_schema_error(parse_value(value), "task 1");
    }

    #[test]
    fn test_end_before_start() {
        let mut value = sample_value();
        value["projects"][0]["end_date"] = "2023-12-31".into();
        assert_schema_error(parse_value(value), "before start date");

        let mut value = sample_value();
        value["contracts"][1]["end_date"] = "2024-02-01".into();
        assert_schema_error(parse_value(value), "contract 2");
    }

    #[test]
    fn test_negative_money() {
        let mut value = sample_value();
        value["budgets"][0]["spent_budget"] = (-1).into();
        assert_schema_error(parse_value(value), "spent_budget");

        let mut value = sample_value();
        value["invoices"][2]["amount"] = (-15000).into();
        assert_schema_error(parse_value(value), "invoice 3");

        let mut value = sample_value();
        value["contracts"][0]["milestones"][1]["amount"] = (-5).into();
        assert_schema_error(parse_value(value), "تدريب النموذج");
    }

    #[test]
    fn test_duplicate_ids() {
        let mut value = sample_value();
        value["expenses"][2]["id"] = "1".into();
        assert_schema_error(parse_value(value), "duplicate expense id: 1");
    }

    #[test]
    fn test_role_invariants() {
        let mut value = sample_value();
        value["roles"][0]["subroles"][0]["level"] = 3.into();
        assert_schema_error(parse_value(value), "roles");

        let mut value = sample_value();
        value["roles"][0]["subroles"][1]["id"] = "3".into();
        assert_schema_error(parse_value(value), "duplicate role id");
    }

    #[test]
    fn test_flat_role_records() {
        let dataset = Dataset::from_yaml(
            r#"
roles:
  - id: "1"
    name: CEO
  - id: "2"
    name: CTO
    parent_role_id: "1"
  - id: "3"
    name: Lead
    parent_role_id: "2"
"#,
        )
        .unwrap();

        let tree = dataset.role_tree(TreePolicy::default()).unwrap();
        let lead = tree.get("3").unwrap();
        assert_eq!(lead.level, 2);
        assert_eq!(lead.path, "/CEO/CTO/Lead");

        let err = Dataset::from_yaml(
            "roles:\n  - id: \"2\"\n    name: CTO\n    parent_role_id: \"9\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, DashboardError::Schema(_)));
    }

    #[test]
    fn test_flat_roots_only() {
        let dataset = Dataset::from_yaml(
            r#"
roles:
  - id: "1"
    name: CEO
  - id: "2"
    name: CFO
"#,
        )
        .unwrap();

        let tree = dataset.role_tree(TreePolicy::default()).unwrap();
        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.get("1").unwrap().path, "/CEO");
        assert_eq!(tree.get("2").unwrap().level, 0);
    }

    #[test]
    fn test_role_names_checked_on_load() {
        let result = Dataset::from_yaml(
            "roles: [{id: '1', name: ''}, {id: '2', name: 'b', parent_role_id: '1'}]",
        );
        assert_schema_error(result, "role 1");

        let result = Dataset::from_yaml(
            "roles: [{id: '1', name: 'a'}, {id: '2', name: 'a/b', parent_role_id: '1'}]",
        );
        assert_schema_error(result, "must not contain");

        let mut value = sample_value();
        value["roles"][0]["subroles"][1]["name"] = "HR/Ops".into();
        value["roles"][0]["subroles"][1]["path"] = "/المدير العام/HR/Ops".into();
        assert_schema_error(parse_value(value), "role 4");
    }

    #[test]
    fn test_drift_is_accepted() {
        let mut value = sample_value();
        value["budgets"][1]["remaining_budget"] = 1.into();
        let dataset = parse_value(value).unwrap();
        assert_eq!(dataset.budgets[1].remaining(), 60000.0);
    }
}
