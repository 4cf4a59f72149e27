//! Error types for chess engine
//!
//! Provides custom error types for the decision core: move validation at the
//! position boundary, search preconditions, opening-book loading and
//! Q-table persistence.

use thiserror::Error;

/// Errors that can occur in the chess engine
#[derive(Error, Debug)]
pub enum ChessEngineError {
    /// Move rejected by the rules engine for the current position
    #[error("Invalid move: {uci} is not legal in {fen}")]
    InvalidMove { uci: String, fen: String },

    /// Move text could not be parsed as UCI
    #[error("Invalid move notation: {text}")]
    InvalidMoveNotation { text: String },

    /// FEN could not be parsed or does not describe a legal position
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    /// `unmake` called with no matching `make`
    #[error("Unmake called without a matching make")]
    UnmakeWithoutMake,

    /// Search requested on a position without legal moves
    #[error("No legal moves in position {fen}")]
    NoLegalMoves { fen: String },

    /// Decision requested on a finished game
    #[error("Game is already over: {fen}")]
    GameOver { fen: String },

    /// Search algorithm error - stack corruption or logic error
    #[error("Search algorithm error: {message}")]
    SearchError { message: String },

    /// Q-table file could not be read or written
    #[error("Q-table I/O error at {path}: {source}")]
    QTableIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Q-table blob is not a valid serialized table
    #[error("Corrupt Q-table at {path}: {message}")]
    QTableCorrupt { path: String, message: String },

    /// Opening book file could not be read
    #[error("Opening book I/O error at {path}: {source}")]
    BookIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Opening book file has an invalid layout
    #[error("Malformed opening book at {path}: {message}")]
    BookFormat { path: String, message: String },
}

/// Result type alias for chess engine operations
pub type ChessEngineResult<T> = Result<T, ChessEngineError>;
