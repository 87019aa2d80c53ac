//! Repository port traits for quest and progression storage.

use async_trait::async_trait;
use gameblitz_domain::{NewQuest, PlayerQuestProgression, Quest, QuestId, TaskId};

use super::error::RepoError;

// =============================================================================
// Quest Definitions
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestRepo: Send + Sync {
    /// Persist an already validated definition, assigning quest and task IDs.
    async fn create(&self, data: NewQuest) -> Result<Quest, RepoError>;

    /// Soft-deleted quests and quests of other games are `QuestNotFound`.
    async fn get_by_id_and_game(&self, id: QuestId, game_id: &str) -> Result<Quest, RepoError>;

    async fn soft_delete(&self, id: QuestId, game_id: &str) -> Result<(), RepoError>;
}

// =============================================================================
// Player Progressions
// =============================================================================

/// Storage of per-player progressions.
///
/// Implementations serialize `complete_tasks` per (player, quest) key and apply it
/// all-or-nothing; different keys proceed independently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressionRepo: Send + Sync {
    async fn start_for_player(
        &self,
        quest: &Quest,
        player_id: &str,
    ) -> Result<PlayerQuestProgression, RepoError>;

    async fn get_for_player(
        &self,
        quest: &Quest,
        player_id: &str,
    ) -> Result<PlayerQuestProgression, RepoError>;

    /// Mark tasks completed, promote unblocked tasks, and complete the quest when all
    /// required tasks are done, as one atomic step.
    async fn complete_tasks(
        &self,
        quest: &Quest,
        task_ids: &[TaskId],
        player_id: &str,
    ) -> Result<PlayerQuestProgression, RepoError>;
}
