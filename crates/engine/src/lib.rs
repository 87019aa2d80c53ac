//! GameBlitz quest engine library.
//!
//! ## Structure
//!
//! - `use_cases/` - Quest definition and player progression orchestration
//! - `infrastructure/` - Ports plus their adapters (rules, storage, notifiers, config)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
