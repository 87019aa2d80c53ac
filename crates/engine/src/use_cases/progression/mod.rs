//! Player progression use cases.
//!
//! Drives a player through a quest's task graph:
//! 1. The player starts the quest (dependency-free tasks become active)
//! 2. Game events are submitted as JSON (ApplyEvent)
//! 3. Active tasks whose rules accept the event are completed
//! 4. Completion cascades to dependent tasks and, eventually, the quest
//! 5. The refreshed progression is published

use std::sync::Arc;

use gameblitz_domain::{DomainError, PlayerQuestProgression, Quest, QuestId, TaskId};

use crate::infrastructure::ports::{NotifyError, ProgressionRepo, RepoError, RuleError};
use crate::use_cases::validation::require_non_empty;

mod apply_event;

pub use apply_event::ApplyEvent;

/// Container for progression use cases.
pub struct ProgressionUseCases {
    pub ops: Arc<ProgressionOps>,
    pub apply_event: Arc<ApplyEvent>,
}

impl ProgressionUseCases {
    pub fn new(ops: Arc<ProgressionOps>, apply_event: Arc<ApplyEvent>) -> Self {
        Self { ops, apply_event }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProgressionError {
    #[error("Player ID cannot be empty")]
    InvalidPlayerId,

    #[error("Quest not found: {0}")]
    QuestNotFound(QuestId),

    #[error("Player {player_id} already started quest {quest_id}")]
    AlreadyStarted { player_id: String, quest_id: QuestId },

    #[error("Player {player_id} has not started quest {quest_id}")]
    NotStarted { player_id: String, quest_id: QuestId },

    #[error("Player {player_id} already completed quest {quest_id}")]
    AlreadyCompleted { player_id: String, quest_id: QuestId },

    /// Task is not part of the quest or cannot be completed yet.
    #[error("Invalid task ID: {0}")]
    InvalidTaskId(TaskId),

    #[error("Broken event data: {0}")]
    BrokenEventData(String),

    #[error("Rule does not return a boolean: {0}")]
    RuleNotBoolean(String),

    #[error(transparent)]
    Rule(RuleError),

    /// The progression was updated and stored; only publishing it failed.
    #[error("Progression updated but notification failed: {source}")]
    Notification {
        progression: Box<PlayerQuestProgression>,
        #[source]
        source: NotifyError,
    },

    #[error(transparent)]
    Repo(RepoError),
}

impl From<RuleError> for ProgressionError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::BrokenData(reason) => ProgressionError::BrokenEventData(reason),
            RuleError::NotBoolean(value) => ProgressionError::RuleNotBoolean(value),
            other => ProgressionError::Rule(other),
        }
    }
}

impl From<RepoError> for ProgressionError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::QuestNotFound(id) => ProgressionError::QuestNotFound(id),
            RepoError::ProgressionNotFound {
                player_id,
                quest_id,
            } => ProgressionError::NotStarted {
                player_id,
                quest_id,
            },
            RepoError::AlreadyStarted {
                player_id,
                quest_id,
            } => ProgressionError::AlreadyStarted {
                player_id,
                quest_id,
            },
            RepoError::Transition(DomainError::QuestAlreadyCompleted {
                quest_id,
                player_id,
            }) => ProgressionError::AlreadyCompleted {
                player_id,
                quest_id,
            },
            RepoError::Transition(DomainError::UnknownTask { task_id, .. })
            | RepoError::Transition(DomainError::TaskNotActive(task_id)) => {
                ProgressionError::InvalidTaskId(task_id)
            }
            other => ProgressionError::Repo(other),
        }
    }
}

fn require_player(player_id: &str) -> Result<(), ProgressionError> {
    require_non_empty(player_id, "player_id").map_err(|_| ProgressionError::InvalidPlayerId)
}

/// Start and read player progressions.
pub struct ProgressionOps {
    progressions: Arc<dyn ProgressionRepo>,
}

impl ProgressionOps {
    pub fn new(progressions: Arc<dyn ProgressionRepo>) -> Self {
        Self { progressions }
    }

    pub async fn start(
        &self,
        quest: &Quest,
        player_id: &str,
    ) -> Result<PlayerQuestProgression, ProgressionError> {
        require_player(player_id)?;

        let progression = self
            .progressions
            .start_for_player(quest, player_id)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    player_id = %player_id,
                    quest_id = %quest.id,
                    error = %e,
                    "Failed to start quest"
                )
            })?;

        tracing::info!(
            player_id = %player_id,
            quest_id = %quest.id,
            active_tasks = progression.active_tasks().count(),
            "Quest started"
        );
        Ok(progression)
    }

    pub async fn get(
        &self,
        quest: &Quest,
        player_id: &str,
    ) -> Result<PlayerQuestProgression, ProgressionError> {
        require_player(player_id)?;
        Ok(self.progressions.get_for_player(quest, player_id).await?)
    }
}
