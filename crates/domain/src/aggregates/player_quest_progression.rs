//! PlayerQuestProgression aggregate - one player's run through a quest
//!
//! A progression owns a snapshot of the quest taken when the player started it, so
//! later changes to the definition (including soft deletion) never rewrite history.
//!
//! # Transition
//!
//! `complete_tasks` is the single mutation. It marks the given active tasks completed,
//! promotes every pending task whose dependencies are now all completed, and completes
//! the quest once every required task is completed. The method validates all input
//! before touching state, so a rejected call leaves the aggregate unchanged.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Quest, Task};
use crate::error::DomainError;
use crate::events::ProgressionEvent;
use crate::ids::{QuestId, TaskId};

/// Lifecycle of a single task for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// At least one dependency is not completed yet
    Pending,
    /// Dependencies satisfied; the task's rule is evaluated against incoming events
    Active,
    Completed,
}

/// Lifecycle of a quest for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestStatus {
    Started,
    Completed,
}

/// Progress of one task of the quest snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTaskProgression {
    task: Task,
    started_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl PlayerTaskProgression {
    fn new(task: Task, now: DateTime<Utc>) -> Self {
        let started_at = (!task.has_dependencies()).then_some(now);
        Self {
            task,
            started_at,
            updated_at: now,
            completed_at: None,
        }
    }

    #[inline]
    pub fn task(&self) -> &Task {
        &self.task
    }

    #[inline]
    pub fn task_id(&self) -> TaskId {
        self.task.id
    }

    #[inline]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[inline]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn status(&self) -> TaskStatus {
        match (self.started_at, self.completed_at) {
            (_, Some(_)) => TaskStatus::Completed,
            (Some(_), None) => TaskStatus::Active,
            (None, None) => TaskStatus::Pending,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == TaskStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    fn activate(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.updated_at = now;
    }

    fn complete(&mut self, now: DateTime<Utc>) {
        self.completed_at = Some(now);
        self.updated_at = now;
    }
}

/// A player's progression through a quest
///
/// # Invariants
///
/// - `completed_at` is set iff every task with `required_for_completion` is completed
/// - A task is never completed before it was started
/// - Completed tasks and completed quests never change again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerQuestProgression {
    player_id: String,
    quest: Quest,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    tasks: Vec<PlayerTaskProgression>,
}

impl PlayerQuestProgression {
    /// Start a quest for a player.
    ///
    /// Dependency-free tasks become active immediately; the rest stay pending. A quest
    /// without any required task is completed on the spot.
    pub fn start(quest: Quest, player_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let tasks = quest
            .tasks
            .iter()
            .cloned()
            .map(|task| PlayerTaskProgression::new(task, now))
            .collect();

        let mut progression = Self {
            player_id: player_id.into(),
            quest,
            started_at: now,
            updated_at: now,
            completed_at: None,
            tasks,
        };
        if progression.required_tasks_completed() {
            progression.completed_at = Some(now);
        }
        progression
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    #[inline]
    pub fn quest(&self) -> &Quest {
        &self.quest
    }

    #[inline]
    pub fn quest_id(&self) -> QuestId {
        self.quest.id
    }

    #[inline]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[inline]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[inline]
    pub fn tasks(&self) -> &[PlayerTaskProgression] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&PlayerTaskProgression> {
        self.tasks.iter().find(|t| t.task_id() == id)
    }

    pub fn active_tasks(&self) -> impl Iterator<Item = &PlayerTaskProgression> {
        self.tasks.iter().filter(|t| t.is_active())
    }

    pub fn status(&self) -> QuestStatus {
        if self.is_completed() {
            QuestStatus::Completed
        } else {
            QuestStatus::Started
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    // =========================================================================
    // Transition
    // =========================================================================

    /// Apply a set of newly completed tasks and cascade the consequences.
    ///
    /// IDs of tasks that are already completed are skipped, so two racing callers that
    /// computed the same set converge on the same state. An empty effective set returns
    /// no events and leaves the progression untouched.
    ///
    /// # Errors
    ///
    /// - `QuestAlreadyCompleted` when the progression is terminal
    /// - `UnknownTask` when an ID is not part of the quest snapshot
    /// - `TaskNotActive` when a task is still pending
    pub fn complete_tasks(
        &mut self,
        task_ids: &[TaskId],
        now: DateTime<Utc>,
    ) -> Result<Vec<ProgressionEvent>, DomainError> {
        if self.is_completed() {
            return Err(DomainError::quest_already_completed(
                self.quest.id,
                self.player_id.clone(),
            ));
        }

        let mut to_complete: Vec<TaskId> = Vec::with_capacity(task_ids.len());
        for id in task_ids {
            let task = self
                .task(*id)
                .ok_or_else(|| DomainError::unknown_task(self.quest.id, *id))?;
            match task.status() {
                TaskStatus::Completed => continue,
                TaskStatus::Pending => return Err(DomainError::TaskNotActive(*id)),
                TaskStatus::Active => {
                    if !to_complete.contains(id) {
                        to_complete.push(*id);
                    }
                }
            }
        }

        let mut events = Vec::new();
        if to_complete.is_empty() {
            return Ok(events);
        }

        for task in &mut self.tasks {
            if to_complete.contains(&task.task_id()) {
                task.complete(now);
                events.push(ProgressionEvent::TaskCompleted {
                    task_id: task.task_id(),
                });
            }
        }

        let completed: HashSet<TaskId> = self
            .tasks
            .iter()
            .filter(|t| t.is_completed())
            .map(|t| t.task_id())
            .collect();

        for task in &mut self.tasks {
            let ready = task.status() == TaskStatus::Pending
                && task.task.depends_on.iter().all(|dep| completed.contains(dep));
            if ready {
                task.activate(now);
                events.push(ProgressionEvent::TaskActivated {
                    task_id: task.task_id(),
                });
            }
        }

        self.updated_at = now;

        if self.required_tasks_completed() {
            self.completed_at = Some(now);
            events.push(ProgressionEvent::QuestCompleted {
                quest_id: self.quest.id,
                player_id: self.player_id.clone(),
            });
        }

        Ok(events)
    }

    fn required_tasks_completed(&self) -> bool {
        self.tasks
            .iter()
            .filter(|t| t.task.required_for_completion)
            .all(|t| t.is_completed())
    }
}
