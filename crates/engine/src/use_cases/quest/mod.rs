//! Quest definition use cases.
//!
//! Create validates the whole definition before anything is persisted; get and delete
//! are scoped to the game that owns the quest.

use std::sync::Arc;

use gameblitz_domain::{NewQuest, Quest, QuestId};

use crate::infrastructure::ports::{QuestRepo, RepoError};
use crate::use_cases::validation::{parse_id, ValidationError};

mod validate;

pub use validate::{QuestValidationError, QuestViolation, TaskGraphValidator, ViolationKind};

/// Container for quest use cases.
pub struct QuestUseCases {
    pub ops: Arc<QuestOps>,
}

impl QuestUseCases {
    pub fn new(ops: Arc<QuestOps>) -> Self {
        Self { ops }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuestError {
    #[error(transparent)]
    Validation(#[from] QuestValidationError),

    #[error("Invalid quest ID: {0}")]
    InvalidQuestId(#[source] ValidationError),

    #[error("Quest not found: {0}")]
    NotFound(QuestId),

    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for QuestError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::QuestNotFound(id) => QuestError::NotFound(id),
            other => QuestError::Repo(other),
        }
    }
}

pub struct QuestOps {
    quests: Arc<dyn QuestRepo>,
    validator: Arc<TaskGraphValidator>,
}

impl QuestOps {
    pub fn new(quests: Arc<dyn QuestRepo>, validator: Arc<TaskGraphValidator>) -> Self {
        Self { quests, validator }
    }

    pub async fn create(&self, data: NewQuest) -> Result<Quest, QuestError> {
        if let Err(err) = self.validator.validate(&data) {
            tracing::warn!(
                game_id = %data.game_id,
                violations = err.violations().len(),
                "Rejected quest definition"
            );
            return Err(err.into());
        }

        let quest = self.quests.create(data).await?;
        tracing::info!(
            quest_id = %quest.id,
            game_id = %quest.game_id,
            tasks = quest.tasks.len(),
            "Quest created"
        );
        Ok(quest)
    }

    pub async fn get(&self, quest_id: &str, game_id: &str) -> Result<Quest, QuestError> {
        let id = parse_quest_id(quest_id)?;
        Ok(self.quests.get_by_id_and_game(id, game_id).await?)
    }

    pub async fn soft_delete(&self, quest_id: &str, game_id: &str) -> Result<(), QuestError> {
        let id = parse_quest_id(quest_id)?;
        self.quests.soft_delete(id, game_id).await?;
        tracing::info!(quest_id = %id, game_id = %game_id, "Quest deleted");
        Ok(())
    }
}

fn parse_quest_id(raw: &str) -> Result<QuestId, QuestError> {
    parse_id(raw, "quest_id").map_err(QuestError::InvalidQuestId)
}
