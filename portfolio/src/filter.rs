//! Project filtering pipeline.
//!
//! Three independent predicates combined with AND: a case-sensitive search
//! term over name, description and client; a status selection; a project
//! type selection. An empty term or an `all` selection lets everything through.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Filter sentinel that matches every value.
pub const ALL: &str = "all";

/// A filter value: either the `all` sentinel or one concrete value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }

    /// Like [`matches`](Self::matches) for optional fields; a missing value
    /// only passes the `all` selection.
    pub fn matches_opt(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Self::All, _) => true,
            (Self::Only(expected), Some(value)) => expected == value,
            (Self::Only(_), None) => false,
        }
    }
}

impl<T: FromStr> FromStr for Selection<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Only(value) => value.fmt(f),
        }
    }
}

impl<T: fmt::Display> Serialize for Selection<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The project list's search box plus its two dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilter {
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub status: Selection<ProjectStatus>,
    #[serde(default)]
    pub project_type: Selection<ProjectType>,
}

impl ProjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the search term.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Builder: restrict to one status.
    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = Selection::Only(status);
        self
    }

    /// Builder: restrict to one project type.
    pub fn with_type(mut self, project_type: ProjectType) -> Self {
        self.project_type = Selection::Only(project_type);
        self
    }

    fn matches_term(&self, project: &Project) -> bool {
        let term = self.search_term.as_str();
        term.is_empty()
            || project.name.contains(term)
            || project.description.contains(term)
            || project
                .client
                .as_deref()
                .is_some_and(|client| client.contains(term))
    }

    pub fn matches(&self, project: &Project) -> bool {
        self.matches_term(project)
            && self.status.matches(&project.status)
            && self.project_type.matches_opt(project.project_type.as_ref())
    }

    /// Matching projects, in input order.
    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}
