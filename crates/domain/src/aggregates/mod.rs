//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate keeps its fields private, exposes behavior through methods, and
//! returns domain events from mutations.

pub mod player_quest_progression;

pub use player_quest_progression::{
    PlayerQuestProgression, PlayerTaskProgression, QuestStatus, TaskStatus,
};
