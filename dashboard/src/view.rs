//! Dashboard view-model.
//!
//! Owns the role tree, the record collections and the per-view state (role
//! tree expansion, role search, project filter), and derives the cards the
//! presentation layer renders.

use chrono::{DateTime, Utc};
use finance::budget::{self, BudgetTotals};
use finance::contract;
use finance::{Budget, BudgetCategory, Contract, ContractMilestone, Expense, FinanceSummary, Invoice};
use hierarchy::{
    permission_badges, Role, RoleDraft, RoleTree, RoleTreeView, DEFAULT_BADGE_LIMIT,
};
use portfolio::aggregate;
use portfolio::{PortfolioTotals, Project, ProjectFilter, ProjectStatus, Task};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::error::Result;

/// Headline numbers for the landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub generated_at: DateTime<Utc>,
    pub roles: usize,
    pub assigned_users: u64,
    pub portfolio: PortfolioTotals,
    pub project_status: Vec<(ProjectStatus, usize)>,
    pub finance: FinanceSummary,
}

/// One line of the rendered role tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub level: u32,
    pub indent: u32,
    pub expanded: bool,
    pub has_children: bool,
    pub assigned_users: u32,
    pub permissions: &'a [String],
    /// Permissions beyond the badge limit ("+N more")
    pub more_permissions: usize,
}

/// A project with its derived figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCard<'a> {
    pub project: &'a Project,
    pub budget_remaining: f64,
    pub budget_utilization: f64,
    pub is_over_budget: bool,
    pub duration_days: i64,
    pub milestone_completion: f64,
    pub tasks: usize,
}

/// A budget with its derived figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetCard<'a> {
    pub budget: &'a Budget,
    pub utilization: f64,
    pub is_over_budget: bool,
    pub overage: f64,
    pub remaining: f64,
    pub top_categories: Vec<&'a BudgetCategory>,
}

/// A contract with its derived figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractCard<'a> {
    pub contract: &'a Contract,
    pub completion: f64,
    pub next_milestone: Option<&'a ContractMilestone>,
    pub earned: f64,
    pub paid: f64,
}

/// In-memory dashboard state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    tree: RoleTree,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    budgets: Vec<Budget>,
    expenses: Vec<Expense>,
    contracts: Vec<Contract>,
    invoices: Vec<Invoice>,
    role_view: RoleTreeView,
    project_filter: ProjectFilter,
    top_categories: usize,
}

impl Dashboard {
    /// Build from a validated dataset.
    pub fn new(dataset: Dataset, config: &DashboardConfig) -> Result<Self> {
        let tree = dataset.role_tree(config.tree_policy())?;
        tracing::info!(
            roles = tree.len(),
            projects = dataset.projects.len(),
            budgets = dataset.budgets.len(),
            contracts = dataset.contracts.len(),
            "Dashboard loaded"
        );

        Ok(Self {
            tree,
            projects: dataset.projects,
            tasks: dataset.tasks,
            budgets: dataset.budgets,
            expenses: dataset.expenses,
            contracts: dataset.contracts,
            invoices: dataset.invoices,
            role_view: RoleTreeView::new(),
            project_filter: ProjectFilter::new(),
            top_categories: config.finance.top_categories,
        })
    }

    pub fn roles(&self) -> &RoleTree {
        &self.tree
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn overview(&self) -> Overview {
        Overview {
            generated_at: Utc::now(),
            roles: self.tree.len(),
            assigned_users: self
                .tree
                .flatten()
                .map(|role| u64::from(role.assigned_users))
                .sum(),
            portfolio: PortfolioTotals::compute(&self.projects),
            project_status: aggregate::status_counts(&self.projects),
            finance: FinanceSummary::compute(
                &self.budgets,
                &self.expenses,
                &self.contracts,
                &self.invoices,
            ),
        }
    }

    /// Role view state (search term, collapsed nodes).
    pub fn role_view(&self) -> &RoleTreeView {
        &self.role_view
    }

    pub fn role_view_mut(&mut self) -> &mut RoleTreeView {
        &mut self.role_view
    }

    /// Visible role tree lines for the current view state.
    pub fn role_rows(&self) -> Vec<RoleRow<'_>> {
        self.role_view
            .rows(&self.tree)
            .into_iter()
            .map(|row| {
                let badges = permission_badges(row.role, DEFAULT_BADGE_LIMIT);
                RoleRow {
                    id: &row.role.id,
                    name: &row.role.name,
                    description: &row.role.description,
                    level: row.role.level,
                    indent: row.indent,
                    expanded: row.expanded,
                    has_children: row.has_children,
                    assigned_users: row.role.assigned_users,
                    permissions: badges.shown,
                    more_permissions: badges.overflow,
                }
            })
            .collect()
    }

    /// Create a role under `parent_id` (or as a root).
    pub fn create_role(&mut self, parent_id: Option<&str>, draft: RoleDraft) -> Result<&Role> {
        Ok(self.tree.create_role(parent_id, draft)?)
    }

    /// Delete a role under the configured orphan policy.
    pub fn delete_role(&mut self, id: &str) -> Result<Role> {
        Ok(self.tree.delete_role(id)?)
    }

    pub fn project_filter(&self) -> &ProjectFilter {
        &self.project_filter
    }

    pub fn set_project_filter(&mut self, filter: ProjectFilter) {
        self.project_filter = filter;
    }

    /// Projects passing the current filter, in input order.
    pub fn visible_projects(&self) -> Vec<ProjectCard<'_>> {
        self.project_filter
            .apply(&self.projects)
            .into_iter()
            .map(|project| ProjectCard {
                project,
                budget_remaining: aggregate::budget_remaining(project),
                budget_utilization: aggregate::budget_utilization(project),
                is_over_budget: aggregate::is_over_budget(project),
                duration_days: aggregate::duration_days(project),
                milestone_completion: aggregate::milestone_completion(project),
                tasks: aggregate::tasks_for_project(&self.tasks, &project.id).count(),
            })
            .collect()
    }

    pub fn budget_cards(&self) -> Vec<BudgetCard<'_>> {
        self.budgets
            .iter()
            .map(|b| BudgetCard {
                budget: b,
                utilization: budget::utilization_percent(b),
                is_over_budget: budget::is_over_budget(b),
                overage: budget::overage(b),
                remaining: b.remaining(),
                top_categories: budget::top_categories(b, self.top_categories),
            })
            .collect()
    }

    pub fn budget_totals(&self) -> BudgetTotals {
        BudgetTotals::compute(&self.budgets)
    }

    pub fn contract_cards(&self) -> Vec<ContractCard<'_>> {
        self.contracts
            .iter()
            .map(|c| ContractCard {
                contract: c,
                completion: contract::contract_completion(c),
                next_milestone: contract::next_milestone(c),
                earned: contract::contract_earned_amount(c),
                paid: contract::contract_paid_amount(c, &self.invoices),
            })
            .collect()
    }
}
