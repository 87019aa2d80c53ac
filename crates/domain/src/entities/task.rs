//! Task entity - a single rule-gated step of a quest
//!
//! At definition time tasks reference their dependencies by position in the quest's
//! task list (`NewTask::depends_on`). Once persisted, positions are replaced with
//! `TaskId`s (`Task::depends_on`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::TaskId;

fn default_required() -> bool {
    true
}

/// Task data as submitted by a game when defining a quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Indices of the tasks (within the same quest) that must complete first
    #[serde(default)]
    pub depends_on: Vec<usize>,
    #[serde(default = "default_required")]
    pub required_for_completion: bool,
    /// Completion predicate, evaluated against player event data
    pub rule: String,
}

impl NewTask {
    pub fn new(name: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            depends_on: Vec::new(),
            required_for_completion: true,
            rule: rule.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_depends_on(mut self, depends_on: Vec<usize>) -> Self {
        self.depends_on = depends_on;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required_for_completion = required;
        self
    }
}

/// A persisted task definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub depends_on: Vec<TaskId>,
    pub required_for_completion: bool,
    pub rule: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn has_dependencies(&self) -> bool {
        !self.depends_on.is_empty()
    }
}
