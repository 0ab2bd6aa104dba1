//! Core types for projects and tasks.
//!
//! Enum values serialize in `snake_case`, matching the records the
//! dashboard frontend and the project API exchange.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Error returned when a filter or enum value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `all`, `Display` and `FromStr` for a unit enum.
#[macro_export]
macro_rules! string_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Every variant in declaration order.
            pub fn all() -> Vec<Self> {
                vec![$(Self::$variant),+]
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = $crate::types::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::types::ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Progress state shared by milestones and subtasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
}

string_enum!(StageStatus, "stage status", {
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
});

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

string_enum!(ProjectStatus, "project status", {
    Planning => "planning",
    Active => "active",
    OnHold => "on_hold",
    Completed => "completed",
    Cancelled => "cancelled",
});

/// Priority of a project or task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

string_enum!(Priority, "priority", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

/// Kind of project, as offered by the creation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    AiProject,
    WebDevelopment,
    MobileDevelopment,
    DataAnalysis,
    Consulting,
}

string_enum!(ProjectType, "project type", {
    AiProject => "ai_project",
    WebDevelopment => "web_development",
    MobileDevelopment => "mobile_development",
    DataAnalysis => "data_analysis",
    Consulting => "consulting",
});

/// AI specialty of an `ai_project`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum AiCategory {
    ComputerVision,
    Nlp,
    Prediction,
    Recommendation,
    Robotics,
    Speech,
}

string_enum!(AiCategory, "ai category", {
    ComputerVision => "computer_vision",
    Nlp => "nlp",
    Prediction => "prediction",
    Recommendation => "recommendation",
    Robotics => "robotics",
    Speech => "speech",
});

/// Risk severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A project as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Completion percent (0-100)
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub team_size: u32,
    #[serde(default)]
    pub budget: f64,
    /// May exceed `budget`; over-budget is a valid state
    #[serde(default)]
    pub spent_budget: f64,
    #[serde(default)]
    pub project_type: Option<ProjectType>,
    #[serde(default)]
    pub ai_category: Option<AiCategory>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub project_manager: Option<String>,
    #[serde(default)]
    pub datasets: Vec<TrainingDataset>,
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    #[serde(default)]
    pub milestones: Vec<ProjectMilestone>,
    #[serde(default)]
    pub risks: Vec<Risk>,
}

/// A dated project deliverable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ProjectMilestone {
    pub name: String,
    pub status: StageStatus,
    pub date: NaiveDate,
}

/// Lifecycle of a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Training,
    Trained,
    Deployed,
    Backup,
}

/// A model produced by an AI project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ModelInfo {
    pub name: String,
    /// Display string such as `"94.2%"`
    pub accuracy: String,
    pub status: ModelStatus,
}

impl ModelInfo {
    /// Numeric accuracy, if the display string parses.
    pub fn accuracy_percent(&self) -> Option<f64> {
        self.accuracy
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

/// Processing state of a training dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    Pending,
    Processing,
    Processed,
}

/// A dataset used by an AI project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TrainingDataset {
    pub name: String,
    /// Display string such as `"25GB"`
    pub size: String,
    pub status: DatasetStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Risk {
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub mitigation: String,
}

/// Task workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Testing,
    Completed,
    Blocked,
}

string_enum!(TaskStatus, "task status", {
    Todo => "todo",
    InProgress => "in_progress",
    Review => "review",
    Testing => "testing",
    Completed => "completed",
    Blocked => "blocked",
});

/// A unit of work inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub assigned_to_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Completion percent (0-100)
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub estimated_hours: Option<u32>,
    #[serde(default)]
    pub actual_hours: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ids of tasks this one waits on
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub status: StageStatus,
}

/// A discussion entry on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Comment {
    pub id: String,
    pub user: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Display timestamp, e.g. "2 hours ago"
    pub timestamp: String,
    pub content: String,
}
