//! Unified error types for the domain layer
//!
//! Provides a common error type for quest and progression invariants so adapters
//! never have to fall back to String or anyhow.

use thiserror::Error;

use crate::ids::{QuestId, TaskId};

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Task ID is not part of the quest the progression was started on
    #[error("Task {task_id} does not belong to quest {quest_id}")]
    UnknownTask { quest_id: QuestId, task_id: TaskId },

    /// Task is still waiting on its dependencies
    #[error("Task {0} is not active and cannot be completed")]
    TaskNotActive(TaskId),

    /// Quest progression is in its terminal state
    #[error("Quest {quest_id} already completed by player {player_id}")]
    QuestAlreadyCompleted { quest_id: QuestId, player_id: String },
}

impl DomainError {
    /// Create an unknown task error
    pub fn unknown_task(quest_id: QuestId, task_id: TaskId) -> Self {
        Self::UnknownTask { quest_id, task_id }
    }

    /// Create a quest already completed error
    pub fn quest_already_completed(quest_id: QuestId, player_id: impl Into<String>) -> Self {
        Self::QuestAlreadyCompleted {
            quest_id,
            player_id: player_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_error() {
        let err = "abc".parse::<QuestId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
        assert_eq!(err.to_string(), "Invalid ID format: abc");
    }

    #[test]
    fn test_unknown_task_error() {
        let quest_id = QuestId::new();
        let task_id = TaskId::new();
        let err = DomainError::unknown_task(quest_id, task_id);
        assert!(err.to_string().contains(&task_id.to_string()));
        assert!(err.to_string().contains(&quest_id.to_string()));
    }

    #[test]
    fn test_quest_already_completed_error() {
        let err = DomainError::quest_already_completed(QuestId::new(), "player-7");
        assert!(matches!(err, DomainError::QuestAlreadyCompleted { .. }));
        assert!(err.to_string().contains("player-7"));
    }
}
