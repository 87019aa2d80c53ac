//! Entity modules - quest definition data owned by games
//!
//! Entities here are plain data with public fields; invariants that span several
//! fields live in the aggregates module.

pub mod quest;
pub mod task;

pub use quest::{NewQuest, Quest};
pub use task::{NewTask, Task};
