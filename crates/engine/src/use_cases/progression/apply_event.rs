//! Apply a game event to a player's quest progression.

use std::sync::Arc;

use gameblitz_domain::{PlayerQuestProgression, Quest, TaskId};

use super::{require_player, ProgressionError};
use crate::infrastructure::ports::{ProgressionNotifier, ProgressionRepo, RuleEvaluator};

/// Evaluate active tasks against an event and commit the resulting completions.
///
/// Every active task's rule sees the same event data; a task unlocked by this event is
/// only evaluated on the next one. The commit (complete, unlock, finish quest) is a
/// single repository call.
pub struct ApplyEvent {
    progressions: Arc<dyn ProgressionRepo>,
    evaluator: Arc<dyn RuleEvaluator>,
    notifier: Option<Arc<dyn ProgressionNotifier>>,
}

impl ApplyEvent {
    pub fn new(
        progressions: Arc<dyn ProgressionRepo>,
        evaluator: Arc<dyn RuleEvaluator>,
        notifier: Option<Arc<dyn ProgressionNotifier>>,
    ) -> Self {
        Self {
            progressions,
            evaluator,
            notifier,
        }
    }

    /// `event_data` is the raw JSON payload submitted by the game.
    pub async fn execute(
        &self,
        quest: &Quest,
        player_id: &str,
        event_data: &str,
    ) -> Result<PlayerQuestProgression, ProgressionError> {
        require_player(player_id)?;

        let progression = self.progressions.get_for_player(quest, player_id).await?;

        if progression.is_completed() {
            tracing::warn!(
                player_id = %player_id,
                quest_id = %quest.id,
                "Event rejected for completed quest"
            );
            return Err(ProgressionError::AlreadyCompleted {
                player_id: player_id.to_string(),
                quest_id: quest.id,
            });
        }

        let completed = self.passing_tasks(&progression, event_data)?;
        if completed.is_empty() {
            tracing::debug!(
                player_id = %player_id,
                quest_id = %quest.id,
                "Event completed no tasks"
            );
            return Ok(progression);
        }

        let updated = self
            .progressions
            .complete_tasks(quest, &completed, player_id)
            .await?;

        tracing::info!(
            player_id = %player_id,
            quest_id = %quest.id,
            completed = completed.len(),
            active = updated.active_tasks().count(),
            "Tasks completed"
        );
        if updated.is_completed() {
            tracing::info!(player_id = %player_id, quest_id = %quest.id, "Quest completed");
        }

        if let Some(notifier) = &self.notifier {
            if let Err(source) = notifier.notify(&updated).await {
                tracing::warn!(
                    player_id = %player_id,
                    quest_id = %quest.id,
                    error = %source,
                    "Progression stored but notification failed"
                );
                return Err(ProgressionError::Notification {
                    progression: Box::new(updated),
                    source,
                });
            }
        }

        Ok(updated)
    }

    /// IDs of active tasks whose rule accepts the event. Any evaluation failure aborts.
    fn passing_tasks(
        &self,
        progression: &PlayerQuestProgression,
        event_data: &str,
    ) -> Result<Vec<TaskId>, ProgressionError> {
        let mut passing = Vec::new();
        for task in progression.active_tasks() {
            let accepted = self
                .evaluator
                .evaluate(&task.task().rule, event_data)
                .inspect_err(|e| {
                    tracing::warn!(
                        player_id = %progression.player_id(),
                        task_id = %task.task_id(),
                        error = %e,
                        "Rule evaluation failed"
                    )
                })?;
            if accepted {
                passing.push(task.task_id());
            }
        }
        Ok(passing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::in_memory::InMemoryRepository;
    use crate::infrastructure::json_logic::JsonLogicEvaluator;
    use crate::infrastructure::ports::{
        MockProgressionNotifier, MockProgressionRepo, MockRuleEvaluator, NotifyError, QuestRepo,
        RuleError,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use gameblitz_domain::{NewQuest, NewTask, TaskStatus};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn flag_rule(flag: &str) -> String {
        format!(r#"{{"==": [{{"var": "{flag}"}}, true]}}"#)
    }

    /// A (no deps), B (A), C (A), D (B, C); each rule checks its own flag.
    fn diamond() -> NewQuest {
        NewQuest::new("game-1", "Diamond")
            .with_task(NewTask::new("A", flag_rule("a")), r#"{"a": true}"#)
            .with_task(
                NewTask::new("B", flag_rule("b")).with_depends_on(vec![0]),
                r#"{"b": true}"#,
            )
            .with_task(
                NewTask::new("C", flag_rule("c")).with_depends_on(vec![0]),
                r#"{"c": true}"#,
            )
            .with_task(
                NewTask::new("D", flag_rule("d")).with_depends_on(vec![1, 2]),
                r#"{"d": true}"#,
            )
    }

    fn single_task_quest() -> Quest {
        let data = NewQuest::new("game-1", "Single").with_task(NewTask::new("A", "rule-a"), "{}");
        Quest::from_new(data, now())
    }

    fn statuses(progression: &PlayerQuestProgression) -> Vec<TaskStatus> {
        progression.tasks().iter().map(|t| t.status()).collect()
    }

    #[tokio::test]
    async fn diamond_scenario_cascades_to_completion() {
        let repo = Arc::new(InMemoryRepository::new(Arc::new(FixedClock(now()))));
        let quest = repo.create(diamond()).await.unwrap();
        repo.start_for_player(&quest, "p1").await.unwrap();
        let use_case = ApplyEvent::new(repo.clone(), Arc::new(JsonLogicEvaluator::new()), None);

        // B's flag is set too, but B is still pending, so it is not evaluated yet.
        let after_a = use_case
            .execute(&quest, "p1", r#"{"a": true, "b": true}"#)
            .await
            .unwrap();
        assert_eq!(
            statuses(&after_a),
            vec![
                TaskStatus::Completed,
                TaskStatus::Active,
                TaskStatus::Active,
                TaskStatus::Pending
            ]
        );

        let after_bc = use_case
            .execute(&quest, "p1", r#"{"b": true, "c": true}"#)
            .await
            .unwrap();
        assert_eq!(after_bc.tasks()[3].status(), TaskStatus::Active);
        assert!(after_bc.completed_at().is_none());

        let done = use_case
            .execute(&quest, "p1", r#"{"d": true}"#)
            .await
            .unwrap();
        assert!(done.tasks().iter().all(|t| t.is_completed()));
        assert_eq!(done.completed_at(), Some(now()));
    }

    #[tokio::test]
    async fn repeated_event_is_a_no_op() {
        let repo = Arc::new(InMemoryRepository::new(Arc::new(FixedClock(now()))));
        let quest = repo.create(diamond()).await.unwrap();
        repo.start_for_player(&quest, "p1").await.unwrap();
        let use_case = ApplyEvent::new(repo.clone(), Arc::new(JsonLogicEvaluator::new()), None);

        let first = use_case
            .execute(&quest, "p1", r#"{"a": true}"#)
            .await
            .unwrap();
        let second = use_case
            .execute(&quest, "p1", r#"{"a": true}"#)
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn completed_quest_rejects_events_without_writes() {
        let quest = single_task_quest();
        let mut done = PlayerQuestProgression::start(quest.clone(), "p1", now());
        let task_id = done.tasks()[0].task_id();
        done.complete_tasks(&[task_id], now()).unwrap();

        let mut repo = MockProgressionRepo::new();
        repo.expect_get_for_player()
            .returning(move |_, _| Ok(done.clone()));
        repo.expect_complete_tasks().never();
        let mut evaluator = MockRuleEvaluator::new();
        evaluator.expect_evaluate().never();
        let mut notifier = MockProgressionNotifier::new();
        notifier.expect_notify().never();

        let result = ApplyEvent::new(
            Arc::new(repo),
            Arc::new(evaluator),
            Some(Arc::new(notifier)),
        )
        .execute(&quest, "p1", "{}")
        .await;

        assert!(matches!(
            result,
            Err(ProgressionError::AlreadyCompleted { .. })
        ));
    }

    #[tokio::test]
    async fn evaluation_error_aborts_without_writes() {
        let data = NewQuest::new("game-1", "Two")
            .with_task(NewTask::new("A", "rule-a"), "{}")
            .with_task(NewTask::new("B", "rule-b"), "{}");
        let quest = Quest::from_new(data, now());
        let progression = PlayerQuestProgression::start(quest.clone(), "p1", now());

        let mut repo = MockProgressionRepo::new();
        repo.expect_get_for_player()
            .returning(move |_, _| Ok(progression.clone()));
        repo.expect_complete_tasks().never();
        let mut evaluator = MockRuleEvaluator::new();
        evaluator
            .expect_evaluate()
            .withf(|rule, _| rule == "rule-a")
            .returning(|_, _| Ok(true));
        evaluator
            .expect_evaluate()
            .withf(|rule, _| rule == "rule-b")
            .returning(|_, _| Err(RuleError::BrokenData("unexpected end of input".to_string())));

        let result = ApplyEvent::new(Arc::new(repo), Arc::new(evaluator), None)
            .execute(&quest, "p1", "{")
            .await;

        assert!(matches!(result, Err(ProgressionError::BrokenEventData(_))));
    }

    #[tokio::test]
    async fn non_boolean_rule_is_reported() {
        let quest = single_task_quest();
        let progression = PlayerQuestProgression::start(quest.clone(), "p1", now());

        let mut repo = MockProgressionRepo::new();
        repo.expect_get_for_player()
            .returning(move |_, _| Ok(progression.clone()));
        repo.expect_complete_tasks().never();
        let mut evaluator = MockRuleEvaluator::new();
        evaluator
            .expect_evaluate()
            .returning(|_, _| Err(RuleError::NotBoolean("42".to_string())));

        let result = ApplyEvent::new(Arc::new(repo), Arc::new(evaluator), None)
            .execute(&quest, "p1", "{}")
            .await;

        assert!(matches!(result, Err(ProgressionError::RuleNotBoolean(_))));
    }

    #[tokio::test]
    async fn only_active_tasks_are_evaluated_and_committed() {
        let data = NewQuest::new("game-1", "Chain")
            .with_task(NewTask::new("A", "rule-a"), "{}")
            .with_task(NewTask::new("B", "rule-b").with_depends_on(vec![0]), "{}");
        let quest = Quest::from_new(data, now());
        let a = quest.tasks[0].id;
        let progression = PlayerQuestProgression::start(quest.clone(), "p1", now());
        let mut committed = progression.clone();
        committed.complete_tasks(&[a], now()).unwrap();

        let mut repo = MockProgressionRepo::new();
        repo.expect_get_for_player()
            .returning(move |_, _| Ok(progression.clone()));
        repo.expect_complete_tasks()
            .withf(move |_, ids, player| ids == [a] && player == "p1")
            .times(1)
            .returning(move |_, _, _| Ok(committed.clone()));
        let mut evaluator = MockRuleEvaluator::new();
        evaluator
            .expect_evaluate()
            .withf(|rule, data| rule == "rule-a" && data == r#"{"x": 1}"#)
            .times(1)
            .returning(|_, _| Ok(true));

        let updated = ApplyEvent::new(Arc::new(repo), Arc::new(evaluator), None)
            .execute(&quest, "p1", r#"{"x": 1}"#)
            .await
            .unwrap();

        assert_eq!(updated.tasks()[1].status(), TaskStatus::Active);
    }

    #[tokio::test]
    async fn notification_failure_carries_stored_progression() {
        let quest = single_task_quest();
        let a = quest.tasks[0].id;
        let progression = PlayerQuestProgression::start(quest.clone(), "p1", now());
        let mut committed = progression.clone();
        committed.complete_tasks(&[a], now()).unwrap();

        let mut repo = MockProgressionRepo::new();
        repo.expect_get_for_player()
            .returning(move |_, _| Ok(progression.clone()));
        repo.expect_complete_tasks()
            .times(1)
            .returning(move |_, _, _| Ok(committed.clone()));
        let mut evaluator = MockRuleEvaluator::new();
        evaluator.expect_evaluate().returning(|_, _| Ok(true));
        let mut notifier = MockProgressionNotifier::new();
        notifier
            .expect_notify()
            .withf(|p| p.is_completed())
            .times(1)
            .returning(|_| Err(NotifyError::Publish("broker unavailable".to_string())));

        let result = ApplyEvent::new(
            Arc::new(repo),
            Arc::new(evaluator),
            Some(Arc::new(notifier)),
        )
        .execute(&quest, "p1", "{}")
        .await;

        match result {
            Err(ProgressionError::Notification {
                progression,
                source,
            }) => {
                assert!(progression.is_completed());
                assert!(matches!(source, NotifyError::Publish(_)));
            }
            other => panic!("expected notification error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_passing_task_skips_commit_and_notification() {
        let quest = single_task_quest();
        let progression = PlayerQuestProgression::start(quest.clone(), "p1", now());
        let expected = progression.clone();

        let mut repo = MockProgressionRepo::new();
        repo.expect_get_for_player()
            .returning(move |_, _| Ok(progression.clone()));
        repo.expect_complete_tasks().never();
        let mut evaluator = MockRuleEvaluator::new();
        evaluator.expect_evaluate().returning(|_, _| Ok(false));
        let mut notifier = MockProgressionNotifier::new();
        notifier.expect_notify().never();

        let result = ApplyEvent::new(
            Arc::new(repo),
            Arc::new(evaluator),
            Some(Arc::new(notifier)),
        )
        .execute(&quest, "p1", "{}")
        .await
        .unwrap();

        assert_eq!(result, expected);
    }
}
