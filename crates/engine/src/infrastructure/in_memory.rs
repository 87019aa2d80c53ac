//! In-memory quest and progression storage.
//!
//! Each progression lives behind its own async mutex, so updates to one
//! (player, quest) key are serialized while other keys proceed in parallel. The
//! cascading transition is computed on a copy and swapped in only when it succeeds.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use gameblitz_domain::{NewQuest, PlayerQuestProgression, Quest, QuestId, TaskId};
use tokio::sync::Mutex;

use crate::infrastructure::ports::{ClockPort, ProgressionRepo, QuestRepo, RepoError};

type ProgressionKey = (String, QuestId);

/// Reference storage backing both repository ports.
pub struct InMemoryRepository {
    quests: DashMap<QuestId, Quest>,
    progressions: DashMap<ProgressionKey, Arc<Mutex<PlayerQuestProgression>>>,
    clock: Arc<dyn ClockPort>,
}

impl InMemoryRepository {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            quests: DashMap::new(),
            progressions: DashMap::new(),
            clock,
        }
    }

    /// Current, non-deleted quest owned by `game_id`.
    fn live_quest(&self, id: QuestId, game_id: &str) -> Result<Quest, RepoError> {
        self.quests
            .get(&id)
            .filter(|quest| quest.game_id == game_id && !quest.is_deleted())
            .map(|quest| quest.value().clone())
            .ok_or(RepoError::QuestNotFound(id))
    }

    fn slot(
        &self,
        player_id: &str,
        quest_id: QuestId,
    ) -> Result<Arc<Mutex<PlayerQuestProgression>>, RepoError> {
        self.progressions
            .get(&(player_id.to_string(), quest_id))
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RepoError::progression_not_found(player_id, quest_id))
    }
}

#[async_trait]
impl QuestRepo for InMemoryRepository {
    async fn create(&self, data: NewQuest) -> Result<Quest, RepoError> {
        let quest = Quest::from_new(data, self.clock.now());
        self.quests.insert(quest.id, quest.clone());
        Ok(quest)
    }

    async fn get_by_id_and_game(&self, id: QuestId, game_id: &str) -> Result<Quest, RepoError> {
        self.live_quest(id, game_id)
    }

    async fn soft_delete(&self, id: QuestId, game_id: &str) -> Result<(), RepoError> {
        let mut quest = self
            .quests
            .get_mut(&id)
            .filter(|quest| quest.game_id == game_id && !quest.is_deleted())
            .ok_or(RepoError::QuestNotFound(id))?;
        quest.soft_delete(self.clock.now());
        Ok(())
    }
}

#[async_trait]
impl ProgressionRepo for InMemoryRepository {
    async fn start_for_player(
        &self,
        quest: &Quest,
        player_id: &str,
    ) -> Result<PlayerQuestProgression, RepoError> {
        let snapshot = self.live_quest(quest.id, &quest.game_id)?;

        match self.progressions.entry((player_id.to_string(), quest.id)) {
            Entry::Occupied(_) => Err(RepoError::already_started(player_id, quest.id)),
            Entry::Vacant(vacant) => {
                let progression =
                    PlayerQuestProgression::start(snapshot, player_id, self.clock.now());
                vacant.insert(Arc::new(Mutex::new(progression.clone())));
                Ok(progression)
            }
        }
    }

    async fn get_for_player(
        &self,
        quest: &Quest,
        player_id: &str,
    ) -> Result<PlayerQuestProgression, RepoError> {
        let slot = self.slot(player_id, quest.id)?;
        let progression = slot.lock().await;
        Ok(progression.clone())
    }

    async fn complete_tasks(
        &self,
        quest: &Quest,
        task_ids: &[TaskId],
        player_id: &str,
    ) -> Result<PlayerQuestProgression, RepoError> {
        let slot = self.slot(player_id, quest.id)?;
        let mut current = slot.lock().await;

        let mut next = current.clone();
        let events = next.complete_tasks(task_ids, self.clock.now())?;
        *current = next;

        tracing::debug!(
            player_id = %player_id,
            quest_id = %quest.id,
            events = ?events,
            "Applied task completions"
        );

        Ok(current.clone())
    }
}
