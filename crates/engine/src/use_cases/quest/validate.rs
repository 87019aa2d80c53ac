//! Quest definition validation.
//!
//! All checks run and every violation is collected, so a game gets the complete list of
//! problems with a definition in one round trip.

use std::sync::Arc;

use gameblitz_domain::{DependencyGraph, NewQuest};

use crate::infrastructure::ports::{RuleError, RuleEvaluator};
use crate::use_cases::validation::require_non_empty;

/// A single problem with a quest definition. Task positions are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestViolation {
    #[error("quest name cannot be empty")]
    InvalidName,

    #[error("game ID cannot be empty")]
    MissingGameId,

    #[error("quest has {tasks} task(s) but {examples} task example(s)")]
    TaskCountMismatch { tasks: usize, examples: usize },

    #[error("task {task}: name cannot be empty")]
    InvalidTaskName { task: usize },

    #[error("task {task}: rule is not a valid rule")]
    InvalidRuleSyntax { task: usize },

    #[error("task {task}: example data is broken: {reason}")]
    BrokenExampleData { task: usize, reason: String },

    #[error("task {task}: rule does not return a boolean for its example")]
    RuleNotBoolean { task: usize },

    #[error("task {task}: rule returns false for its example")]
    UnsatisfiedExample { task: usize },

    #[error("task {task}: rule failed on its example: {reason}")]
    RuleEvaluationFailed { task: usize, reason: String },

    #[error("task {task}: invalid dependency index {dependency}")]
    InvalidDependencyIndex { task: usize, dependency: usize },

    #[error("task dependencies contain a cycle")]
    DependencyCycle,
}

/// Field-free discriminant of `QuestViolation`, for matching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    InvalidName,
    MissingGameId,
    TaskCountMismatch,
    InvalidTaskName,
    InvalidRuleSyntax,
    BrokenExampleData,
    RuleNotBoolean,
    UnsatisfiedExample,
    RuleEvaluationFailed,
    InvalidDependencyIndex,
    DependencyCycle,
}

impl QuestViolation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::InvalidName => ViolationKind::InvalidName,
            Self::MissingGameId => ViolationKind::MissingGameId,
            Self::TaskCountMismatch { .. } => ViolationKind::TaskCountMismatch,
            Self::InvalidTaskName { .. } => ViolationKind::InvalidTaskName,
            Self::InvalidRuleSyntax { .. } => ViolationKind::InvalidRuleSyntax,
            Self::BrokenExampleData { .. } => ViolationKind::BrokenExampleData,
            Self::RuleNotBoolean { .. } => ViolationKind::RuleNotBoolean,
            Self::UnsatisfiedExample { .. } => ViolationKind::UnsatisfiedExample,
            Self::RuleEvaluationFailed { .. } => ViolationKind::RuleEvaluationFailed,
            Self::InvalidDependencyIndex { .. } => ViolationKind::InvalidDependencyIndex,
            Self::DependencyCycle => ViolationKind::DependencyCycle,
        }
    }
}

fn join(violations: &[QuestViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Every violation found in a rejected definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("quest validation failed: {}", join(.violations))]
pub struct QuestValidationError {
    violations: Vec<QuestViolation>,
}

impl QuestValidationError {
    pub fn violations(&self) -> &[QuestViolation] {
        &self.violations
    }

    pub fn contains(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind() == kind)
    }
}

/// Checks a proposed quest before it is persisted.
pub struct TaskGraphValidator {
    evaluator: Arc<dyn RuleEvaluator>,
}

impl TaskGraphValidator {
    pub fn new(evaluator: Arc<dyn RuleEvaluator>) -> Self {
        Self { evaluator }
    }

    pub fn validate(&self, data: &NewQuest) -> Result<(), QuestValidationError> {
        let mut violations = Vec::new();

        if require_non_empty(&data.name, "name").is_err() {
            violations.push(QuestViolation::InvalidName);
        }
        if require_non_empty(&data.game_id, "game_id").is_err() {
            violations.push(QuestViolation::MissingGameId);
        }

        // Examples pair with tasks by position.
        if data.tasks.len() != data.task_examples.len() {
            violations.push(QuestViolation::TaskCountMismatch {
                tasks: data.tasks.len(),
                examples: data.task_examples.len(),
            });
            return finish(violations);
        }

        for (task, (definition, example)) in data.tasks.iter().zip(&data.task_examples).enumerate()
        {
            if require_non_empty(&definition.name, "task name").is_err() {
                violations.push(QuestViolation::InvalidTaskName { task });
            }

            if !self.evaluator.is_valid(&definition.rule) {
                violations.push(QuestViolation::InvalidRuleSyntax { task });
                continue;
            }

            match self.evaluator.evaluate(&definition.rule, example) {
                Ok(true) => {}
                Ok(false) => violations.push(QuestViolation::UnsatisfiedExample { task }),
                Err(RuleError::BrokenData(reason)) => {
                    violations.push(QuestViolation::BrokenExampleData { task, reason })
                }
                Err(RuleError::NotBoolean(_)) => {
                    violations.push(QuestViolation::RuleNotBoolean { task })
                }
                Err(other) => violations.push(QuestViolation::RuleEvaluationFailed {
                    task,
                    reason: other.to_string(),
                }),
            }
        }

        let graph = DependencyGraph::from_tasks(&data.tasks);
        violations.extend(graph.invalid_dependencies().into_iter().map(|invalid| {
            QuestViolation::InvalidDependencyIndex {
                task: invalid.task,
                dependency: invalid.dependency,
            }
        }));
        if graph.indices_in_bounds() && graph.has_cycle() {
            violations.push(QuestViolation::DependencyCycle);
        }

        finish(violations)
    }
}

fn finish(violations: Vec<QuestViolation>) -> Result<(), QuestValidationError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(QuestValidationError { violations })
    }
}
