//! Per-project and per-task aggregation.
//!
//! Everything here is a pure function of its inputs. Percentages go through
//! [`percent`], which maps a zero denominator to 0% instead of NaN.

use serde::Serialize;

use crate::types::*;

/// `part / whole × 100`, or `0.0` when the result would not be finite.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let value = part / whole * 100.0;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Budget left on the project: `budget − spent_budget`.
///
/// Negative when over budget. Independent of any finance-side budget record.
pub fn budget_remaining(project: &Project) -> f64 {
    project.budget - project.spent_budget
}

/// Share of the project budget already spent.
pub fn budget_utilization(project: &Project) -> f64 {
    percent(project.spent_budget, project.budget)
}

pub fn is_over_budget(project: &Project) -> bool {
    project.spent_budget > project.budget
}

/// Whole days from start to end date.
///
/// Dates carry no time of day, so the day difference is already the ceiling.
pub fn duration_days(project: &Project) -> i64 {
    (project.end_date - project.start_date).num_days()
}

/// Share of milestones marked completed.
pub fn milestone_completion(project: &Project) -> f64 {
    let completed = project
        .milestones
        .iter()
        .filter(|m| m.status == StageStatus::Completed)
        .count();
    percent(completed as f64, project.milestones.len() as f64)
}

/// Share of subtasks marked completed.
pub fn subtask_completion(task: &Task) -> f64 {
    let completed = task
        .subtasks
        .iter()
        .filter(|s| s.status == StageStatus::Completed)
        .count();
    percent(completed as f64, task.subtasks.len() as f64)
}

/// Actual minus estimated hours, when both are known.
pub fn hours_variance(task: &Task) -> Option<i64> {
    match (task.actual_hours, task.estimated_hours) {
        (Some(actual), Some(estimated)) => Some(actual as i64 - estimated as i64),
        _ => None,
    }
}

/// Tasks belonging to `project_id`, in input order.
pub fn tasks_for_project<'a>(
    tasks: &'a [Task],
    project_id: &'a str,
) -> impl Iterator<Item = &'a Task> + 'a {
    tasks.iter().filter(move |task| task.project_id == project_id)
}

/// Number of projects in each status, in status declaration order.
pub fn status_counts(projects: &[Project]) -> Vec<(ProjectStatus, usize)> {
    ProjectStatus::all()
        .into_iter()
        .map(|status| {
            let count = projects.iter().filter(|p| p.status == status).count();
            (status, count)
        })
        .collect()
}

/// Headline numbers across all projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioTotals {
    pub projects: usize,
    pub active: usize,
    pub total_budget: f64,
    pub total_spent: f64,
    /// Mean of project progress (0 when there are no projects)
    pub average_progress: f64,
}

impl PortfolioTotals {
    pub fn compute(projects: &[Project]) -> Self {
        let progress_sum: f64 = projects.iter().map(|p| p.progress as f64).sum();
        let totals = Self {
            projects: projects.len(),
            active: projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Active)
                .count(),
            total_budget: projects.iter().map(|p| p.budget).sum(),
            total_spent: projects.iter().map(|p| p.spent_budget).sum(),
            average_progress: percent(progress_sum, projects.len() as f64 * 100.0),
        };

        tracing::debug!(
            projects = totals.projects,
            active = totals.active,
            average_progress = totals.average_progress,
            "Computed portfolio totals"
        );
        totals
    }
}
