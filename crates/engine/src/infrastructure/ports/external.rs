//! External collaborator ports (rule evaluation, progression publishing).

use async_trait::async_trait;
use gameblitz_domain::PlayerQuestProgression;

use super::error::{NotifyError, RuleError};

// =============================================================================
// Rule Evaluation
// =============================================================================

/// Boolean-predicate oracle over JSON data.
///
/// Any expression language works as long as it can tell valid rules apart and reduce a
/// rule plus a JSON document to a boolean.
#[cfg_attr(test, mockall::automock)]
pub trait RuleEvaluator: Send + Sync {
    fn is_valid(&self, rule: &str) -> bool;

    /// `data` is raw JSON text. Non-boolean results are `RuleError::NotBoolean`.
    fn evaluate(&self, rule: &str, data: &str) -> Result<bool, RuleError>;
}

// =============================================================================
// Progression Notifications
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressionNotifier: Send + Sync {
    async fn notify(&self, progression: &PlayerQuestProgression) -> Result<(), NotifyError>;
}
