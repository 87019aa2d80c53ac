//! Progression notifiers.
//!
//! Every change is published as a camelCase JSON `ProgressionMessage` addressed by the
//! routing key `game.{gameId}.quest.{questId}`, so consumers can subscribe per game or per
//! quest. Rules are never published.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gameblitz_domain::{PlayerQuestProgression, PlayerTaskProgression, Quest, Task};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::infrastructure::ports::{NotifyError, ProgressionNotifier};

// =============================================================================
// Message
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMessage {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub id: String,
    pub name: String,
    pub description: String,
    pub depends_on: Vec<String>,
    pub required_for_completion: bool,
}

impl From<&Task> for TaskMessage {
    fn from(task: &Task) -> Self {
        Self {
            created_at: task.created_at,
            updated_at: task.updated_at,
            deleted_at: task.deleted_at,
            id: task.id.to_string(),
            name: task.name.clone(),
            description: task.description.clone(),
            depends_on: task.depends_on.iter().map(ToString::to_string).collect(),
            required_for_completion: task.required_for_completion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestMessage {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub id: String,
    pub game_id: String,
    pub name: String,
    pub description: String,
    pub tasks: Vec<TaskMessage>,
}

impl From<&Quest> for QuestMessage {
    fn from(quest: &Quest) -> Self {
        Self {
            created_at: quest.created_at,
            updated_at: quest.updated_at,
            deleted_at: quest.deleted_at,
            id: quest.id.to_string(),
            game_id: quest.game_id.clone(),
            name: quest.name.clone(),
            description: quest.description.clone(),
            tasks: quest.tasks.iter().map(TaskMessage::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgressionMessage {
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub task: TaskMessage,
}

impl From<&PlayerTaskProgression> for TaskProgressionMessage {
    fn from(progression: &PlayerTaskProgression) -> Self {
        Self {
            started_at: progression.started_at(),
            updated_at: progression.updated_at(),
            completed_at: progression.completed_at(),
            task: TaskMessage::from(progression.task()),
        }
    }
}

/// Wire form of a player's quest progression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionMessage {
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub player_id: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub quest: QuestMessage,
    pub tasks_progression: Vec<TaskProgressionMessage>,
}

impl From<&PlayerQuestProgression> for ProgressionMessage {
    fn from(progression: &PlayerQuestProgression) -> Self {
        Self {
            started_at: progression.started_at(),
            updated_at: progression.updated_at(),
            player_id: progression.player_id().to_string(),
            completed_at: progression.completed_at(),
            quest: QuestMessage::from(progression.quest()),
            tasks_progression: progression
                .tasks()
                .iter()
                .map(TaskProgressionMessage::from)
                .collect(),
        }
    }
}

/// Routing key consumers bind to: `game.{gameId}.quest.{questId}`.
pub fn routing_key(progression: &PlayerQuestProgression) -> String {
    format!(
        "game.{}.quest.{}",
        progression.quest().game_id,
        progression.quest_id()
    )
}

/// An encoded message with its routing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedProgression {
    pub routing_key: String,
    pub body: String,
}

impl PublishedProgression {
    pub fn encode(progression: &PlayerQuestProgression) -> Result<Self, NotifyError> {
        let body = serde_json::to_string(&ProgressionMessage::from(progression))
            .map_err(|e| NotifyError::Encode(e.to_string()))?;
        Ok(Self {
            routing_key: routing_key(progression),
            body,
        })
    }
}

// =============================================================================
// Log Notifier
// =============================================================================

/// Writes every progression change to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressionNotifier for LogNotifier {
    async fn notify(&self, progression: &PlayerQuestProgression) -> Result<(), NotifyError> {
        let published = PublishedProgression::encode(progression)?;
        tracing::info!(
            routing_key = %published.routing_key,
            body = %published.body,
            "Player quest progression updated"
        );
        Ok(())
    }
}

// =============================================================================
// Broadcast Notifier
// =============================================================================

/// Fans progression changes out to in-process subscribers.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<PublishedProgression>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedProgression> {
        self.sender.subscribe()
    }

    /// Hand every published message to `sink` on a background task.
    ///
    /// The task ends once the notifier is dropped and the buffered messages are drained,
    /// so awaiting the handle guarantees nothing sent before the drop is lost.
    pub fn spawn_subscriber<F>(&self, mut sink: F) -> JoinHandle<()>
    where
        F: FnMut(PublishedProgression) + Send + 'static,
    {
        let mut receiver = self.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(published) => sink(published),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Progression subscriber lagging")
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[async_trait]
impl ProgressionNotifier for BroadcastNotifier {
    async fn notify(&self, progression: &PlayerQuestProgression) -> Result<(), NotifyError> {
        let published = PublishedProgression::encode(progression)?;
        let routing_key = published.routing_key.clone();
        // Sending only fails when nobody is listening.
        match self.sender.send(published) {
            Ok(receivers) => {
                tracing::debug!(routing_key = %routing_key, receivers, "Progression broadcast");
            }
            Err(_) => {
                tracing::debug!(routing_key = %routing_key, "Progression broadcast without subscribers");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gameblitz_domain::{NewQuest, NewTask};
    use std::sync::{Arc, Mutex};

    fn progression() -> PlayerQuestProgression {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let data = NewQuest::new("game-9", "Hunt")
            .with_task(NewTask::new("A", r#"{"var": "secret"}"#), "{}")
            .with_task(NewTask::new("B", "true").with_depends_on(vec![0]), "{}");
        PlayerQuestProgression::start(Quest::from_new(data, now), "p1", now)
    }

    #[test]
    fn routing_key_addresses_game_and_quest() {
        let progression = progression();
        assert_eq!(
            routing_key(&progression),
            format!("game.game-9.quest.{}", progression.quest_id())
        );
    }

    #[test]
    fn message_uses_camel_case_and_omits_rules() {
        let progression = progression();
        let published = PublishedProgression::encode(&progression).unwrap();
        let body: serde_json::Value = serde_json::from_str(&published.body).unwrap();

        assert_eq!(body["playerId"], "p1");
        assert_eq!(body["quest"]["gameId"], "game-9");
        assert!(body["completedAt"].is_null());
        assert!(body["tasksProgression"][1]["startedAt"].is_null());
        assert_eq!(
            body["quest"]["tasks"][1]["dependsOn"][0],
            progression.tasks()[0].task_id().to_string()
        );
        assert!(!published.body.contains("secret"));
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_is_not_an_error() {
        let notifier = BroadcastNotifier::new(4);
        assert!(notifier.notify(&progression()).await.is_ok());
    }

    #[tokio::test]
    async fn broadcast_delivers_to_subscribers() {
        let notifier = BroadcastNotifier::new(4);
        let mut receiver = notifier.subscribe();
        let progression = progression();

        notifier.notify(&progression).await.unwrap();

        let published = receiver.recv().await.unwrap();
        assert_eq!(published.routing_key, routing_key(&progression));
        let message: ProgressionMessage = serde_json::from_str(&published.body).unwrap();
        assert_eq!(message, ProgressionMessage::from(&progression));
    }

    #[tokio::test]
    async fn subscriber_drains_every_message_before_finishing() {
        let notifier = BroadcastNotifier::new(4);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let handle = notifier.spawn_subscriber(move |published| {
            sink.lock().unwrap().push(published.routing_key);
        });
        let progression = progression();

        notifier.notify(&progression).await.unwrap();
        notifier.notify(&progression).await.unwrap();
        drop(notifier);
        handle.await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert!(received.iter().all(|key| *key == routing_key(&progression)));
    }

    #[tokio::test]
    async fn log_notifier_accepts_progressions() {
        assert!(LogNotifier::new().notify(&progression()).await.is_ok());
    }
}
