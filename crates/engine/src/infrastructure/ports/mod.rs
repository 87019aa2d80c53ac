//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Storage of quests and progressions (in-memory today, a database later)
//! - Rule evaluation (JsonLogic today, any boolean expression language)
//! - Publishing progression changes (log, broadcast channel, message broker)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{ProgressionRepo, QuestRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{ProgressionNotifier, RuleEvaluator};

// =============================================================================
// Errors
// =============================================================================
pub use error::{NotifyError, RepoError, RuleError};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockProgressionRepo, MockQuestRepo};

#[cfg(test)]
pub use external::{MockProgressionNotifier, MockRuleEvaluator};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;
