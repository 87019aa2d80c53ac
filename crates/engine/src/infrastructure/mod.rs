//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod config;
pub mod in_memory;
pub mod json_logic;
pub mod notifier;
pub mod ports;
