//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    in_memory::InMemoryRepository,
    json_logic::JsonLogicEvaluator,
    ports::{ClockPort, ProgressionNotifier, ProgressionRepo, QuestRepo, RuleEvaluator},
};
use crate::use_cases;

/// Main application state.
///
/// Holds the repository ports and every use case wired against them.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for all repository ports.
pub struct Repositories {
    pub quest: Arc<dyn QuestRepo>,
    pub progression: Arc<dyn ProgressionRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub quest: use_cases::QuestUseCases,
    pub progression: use_cases::ProgressionUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        quest_repo: Arc<dyn QuestRepo>,
        progression_repo: Arc<dyn ProgressionRepo>,
        evaluator: Arc<dyn RuleEvaluator>,
        notifier: Option<Arc<dyn ProgressionNotifier>>,
    ) -> Self {
        let validator = Arc::new(use_cases::TaskGraphValidator::new(evaluator.clone()));
        let quest = use_cases::QuestUseCases::new(Arc::new(use_cases::QuestOps::new(
            quest_repo.clone(),
            validator,
        )));

        let progression = use_cases::ProgressionUseCases::new(
            Arc::new(use_cases::ProgressionOps::new(progression_repo.clone())),
            Arc::new(use_cases::ApplyEvent::new(
                progression_repo.clone(),
                evaluator,
                notifier,
            )),
        );

        Self {
            repositories: Repositories {
                quest: quest_repo,
                progression: progression_repo,
            },
            use_cases: UseCases { quest, progression },
        }
    }

    /// App backed by in-memory storage and JsonLogic rules.
    pub fn in_memory(notifier: Option<Arc<dyn ProgressionNotifier>>) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let store = Arc::new(InMemoryRepository::new(clock));
        Self::new(
            store.clone(),
            store,
            Arc::new(JsonLogicEvaluator::new()),
            notifier,
        )
    }
}
