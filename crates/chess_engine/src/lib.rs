//! Hybrid chess move-decision engine
//!
//! Picks moves for a chess position by combining an opening repertoire,
//! tabular Q-learning trained through self-play, and an alpha-beta search
//! over a hand-tuned evaluation.
//!
//! ## Module Organization
//!
//! - `board` - Game state with make/unmake and game-end detection
//! - `evaluation` - Static evaluation (material, piece-square tables, terms)
//! - `hash` - Transposition table
//! - `search` - Alpha-beta search with iterative deepening
//! - `opening` - Built-in repertoire and Polyglot books
//! - `learning` - Q-table, self-play and training
//! - `agent` - Book / learned / search decision pipeline
//! - `config` - Serializable settings for every stage

pub mod agent;
pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod evaluation;
pub mod hash;
pub mod learning;
pub mod opening;
pub mod search;

pub use agent::{
    AgentMode, Decision, DecisionRecord, GameReport, HybridAgent, MoveSource, PipelineConfig,
};
pub use board::{move_to_uci, position_key, Board, GameOutcome};
pub use config::EngineConfig;
pub use error::{ChessEngineError, ChessEngineResult};
pub use evaluation::{EvalWeights, Evaluator};
pub use hash::{Bound, TranspositionTable};
pub use learning::{QLearningAgent, QLearningConfig, QTable, TrainingStats};
pub use opening::{opening_name, OpeningBook, OpeningConfig};
pub use search::{SearchConfig, SearchEngine, SearchResult};

pub use shakmaty::Move;
