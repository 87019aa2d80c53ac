//! GameBlitz quest domain
//!
//! Quest definitions, the per-player progression aggregate with its cascading
//! transition, and dependency-graph analysis. Nothing in this crate performs I/O.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod task_graph;

pub use aggregates::{PlayerQuestProgression, PlayerTaskProgression, QuestStatus, TaskStatus};
pub use entities::{NewQuest, NewTask, Quest, Task};
pub use error::DomainError;
pub use events::ProgressionEvent;
pub use ids::{QuestId, TaskId};
pub use task_graph::{DependencyGraph, InvalidDependency};
