//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.

pub mod progression;
pub mod quest;
pub mod validation;

pub use progression::{ApplyEvent, ProgressionError, ProgressionOps, ProgressionUseCases};
pub use quest::{
    QuestError, QuestOps, QuestUseCases, QuestValidationError, QuestViolation,
    TaskGraphValidator, ViolationKind,
};
