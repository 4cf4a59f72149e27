//! Core module - application infrastructure around the decision engine
//!
//! - [`error`] - Error type for the application layer
//! - [`difficulty`] - Search-strength presets
//! - [`settings_persistence`] - JSON settings file

pub mod difficulty;
pub mod error;
pub mod settings_persistence;

pub use difficulty::Difficulty;
pub use error::{CoreError, CoreResult};
pub use settings_persistence::{load_settings, save_settings, settings_path, EngineSettings};
