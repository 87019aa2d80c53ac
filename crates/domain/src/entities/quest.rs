//! Quest entity - a named set of tasks forming a dependency DAG
//!
//! `NewQuest` is the definition a game submits; it carries one example payload per task
//! that proves the task's rule is satisfiable. The examples are checked once at creation
//! and never persisted, so `Quest` has no counterpart field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::task::{NewTask, Task};
use crate::ids::{QuestId, TaskId};

/// Quest definition as submitted by a game
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuest {
    pub game_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<NewTask>,
    /// Raw JSON payloads, positionally aligned with `tasks`
    #[serde(default)]
    pub task_examples: Vec<String>,
}

impl NewQuest {
    pub fn new(game_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a task together with the example payload its rule must accept.
    pub fn with_task(mut self, task: NewTask, example: impl Into<String>) -> Self {
        self.tasks.push(task);
        self.task_examples.push(example.into());
        self
    }
}

/// A persisted quest definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: QuestId,
    pub game_id: String,
    pub name: String,
    pub description: String,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Quest {
    /// Materialize a validated definition, assigning IDs and resolving dependency
    /// indices into task IDs.
    ///
    /// Indices are expected to have passed validation; any out-of-range index is dropped.
    pub fn from_new(data: NewQuest, now: DateTime<Utc>) -> Self {
        let task_ids: Vec<TaskId> = data.tasks.iter().map(|_| TaskId::new()).collect();

        let tasks = data
            .tasks
            .into_iter()
            .zip(task_ids.iter().copied())
            .map(|(task, id)| Task {
                id,
                depends_on: task
                    .depends_on
                    .iter()
                    .filter_map(|index| task_ids.get(*index).copied())
                    .collect(),
                name: task.name,
                description: task.description,
                required_for_completion: task.required_for_completion,
                rule: task.rule,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .collect();

        Self {
            id: QuestId::new(),
            game_id: data.game_id,
            name: data.name,
            description: data.description,
            tasks,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Mark the quest and all of its tasks as deleted.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
        for task in &mut self.tasks {
            task.deleted_at = Some(now);
            task.updated_at = now;
        }
    }
}
