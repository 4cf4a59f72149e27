//! Tabular Q-learning trained by self-play
//!
//! ## Module Organization
//!
//! - `qtable` - Value store keyed by position key and UCI move
//! - `agent` - Epsilon-greedy policy, update rule, training loop and persistence
//! - `selfplay` - Episode generation and the reverse-order trace update

mod agent;
mod qtable;
mod selfplay;

pub use agent::{QLearningAgent, QLearningConfig, TrainingStats};
pub use qtable::QTable;
pub use selfplay::{apply_trace, capture_reward, play_episode, EpisodeTrace, TraceStep};
