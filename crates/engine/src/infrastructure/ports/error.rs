//! Error types for port operations.

use gameblitz_domain::{DomainError, QuestId};

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Quest is unknown, belongs to another game, or was soft-deleted.
    #[error("Quest not found: {0}")]
    QuestNotFound(QuestId),

    /// No progression exists for the (player, quest) key.
    #[error("Player {player_id} has not started quest {quest_id}")]
    ProgressionNotFound { player_id: String, quest_id: QuestId },

    #[error("Player {player_id} already started quest {quest_id}")]
    AlreadyStarted { player_id: String, quest_id: QuestId },

    /// The aggregate rejected the transition; nothing was written.
    #[error(transparent)]
    Transition(#[from] DomainError),

    /// Storage operation failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },
}

impl RepoError {
    pub fn progression_not_found(player_id: impl Into<String>, quest_id: QuestId) -> Self {
        Self::ProgressionNotFound {
            player_id: player_id.into(),
            quest_id,
        }
    }

    pub fn already_started(player_id: impl Into<String>, quest_id: QuestId) -> Self {
        Self::AlreadyStarted {
            player_id: player_id.into(),
            quest_id,
        }
    }

    /// Create a Storage error with operation context.
    pub fn storage(operation: &'static str, message: impl ToString) -> Self {
        Self::Storage {
            operation,
            message: message.to_string(),
        }
    }
}

/// Failures reported by a rule evaluator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The rule text is not a rule the evaluator understands.
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// The data the rule runs against is malformed.
    #[error("Broken data: {0}")]
    BrokenData(String),

    /// The rule ran but produced something other than a boolean.
    #[error("Rule result is not a boolean: {0}")]
    NotBoolean(String),

    #[error("Rule evaluation failed: {0}")]
    Evaluation(String),
}

/// Errors from publishing a progression change.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to encode progression message: {0}")]
    Encode(String),
    #[error("Failed to publish progression message: {0}")]
    Publish(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameblitz_domain::TaskId;

    #[test]
    fn domain_errors_convert_into_transition() {
        let task_id = TaskId::new();
        let err: RepoError = DomainError::TaskNotActive(task_id).into();
        assert!(matches!(
            err,
            RepoError::Transition(DomainError::TaskNotActive(id)) if id == task_id
        ));
    }

    #[test]
    fn helpers_keep_player_and_quest() {
        let quest_id = QuestId::new();
        assert!(matches!(
            RepoError::progression_not_found("p1", quest_id),
            RepoError::ProgressionNotFound { ref player_id, quest_id: id } if player_id == "p1" && id == quest_id
        ));
        assert!(matches!(
            RepoError::already_started("p1", quest_id),
            RepoError::AlreadyStarted { quest_id: id, .. } if id == quest_id
        ));
    }

    #[test]
    fn storage_error_names_operation() {
        let err = RepoError::storage("complete_tasks", "lock poisoned");
        assert_eq!(
            err.to_string(),
            "Storage error in complete_tasks: lock poisoned"
        );
    }
}
