//! Error types for core module
//!
//! Provides custom error types for the application layer: settings
//! persistence and engine failures surfaced to the command line.

use chess_engine::ChessEngineError;
use thiserror::Error;

/// Errors that can occur in the core module
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings file I/O error
    #[error("Settings I/O error: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings serialization/deserialization error
    #[error("Settings serialization error: {0}")]
    SettingsSerialization(#[from] serde_json::Error),

    /// Error raised by the decision engine
    #[error(transparent)]
    Engine(#[from] ChessEngineError),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
