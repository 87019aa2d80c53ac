//! Progression mutation outcomes.

use serde::{Deserialize, Serialize};

use crate::ids::{QuestId, TaskId};

/// What changed when completions were applied to a player's progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ProgressionEvent {
    TaskCompleted { task_id: TaskId },
    /// Last dependency cleared; the task is now eligible for rule evaluation.
    TaskActivated { task_id: TaskId },
    QuestCompleted { quest_id: QuestId, player_id: String },
}
