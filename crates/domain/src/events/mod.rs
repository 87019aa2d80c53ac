//! Domain events
//!
//! Aggregate mutations return these enums so callers learn what happened without
//! diffing state.

pub mod progression_events;

pub use progression_events::ProgressionEvent;
