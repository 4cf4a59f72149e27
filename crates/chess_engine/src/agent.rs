//! Hybrid decision pipeline
//!
//! Chooses a move by consulting, in order:
//! 1. the opening repertoire, while the game is in its opening phase
//! 2. the learned Q-values, when the chosen move's value is significant
//! 3. the alpha-beta search
//!
//! Every decision is tagged with the stage that produced it.

use crate::board::{move_to_uci, Board, GameOutcome};
use crate::config::EngineConfig;
use crate::constants::DEFAULT_LEARNED_THRESHOLD;
use crate::error::{ChessEngineError, ChessEngineResult};
use crate::evaluation::Evaluator;
use crate::hash::TranspositionTable;
use crate::learning::QLearningAgent;
use crate::opening::{opening_name, OpeningBook};
use crate::search::{MvvLvaOrdering, SearchEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use shakmaty::Move;
use std::fmt;
use tracing::{debug, info};

/// Stage that produced a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveSource {
    Book,
    Learned,
    Search,
}

impl MoveSource {
    pub fn as_str(self) -> &'static str {
        match self {
            MoveSource::Book => "book",
            MoveSource::Learned => "learned",
            MoveSource::Search => "search",
        }
    }
}

impl fmt::Display for MoveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Book, then learned values, then search
    #[default]
    Hybrid,
    /// Book, then search
    Search,
    /// Learned values only
    Learned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub use_book: bool,
    pub use_learned: bool,
    pub use_search: bool,
    /// Learned moves need a value of larger magnitude to be played
    pub learned_threshold: f64,
    /// Exploration rate of the learned stage at play time
    pub play_epsilon: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_mode(AgentMode::Hybrid)
    }
}

impl PipelineConfig {
    pub fn for_mode(mode: AgentMode) -> Self {
        let (use_book, use_learned, use_search) = match mode {
            AgentMode::Hybrid => (true, true, true),
            AgentMode::Search => (true, false, true),
            AgentMode::Learned => (false, true, false),
        };
        Self {
            use_book,
            use_learned,
            use_search,
            learned_threshold: DEFAULT_LEARNED_THRESHOLD,
            play_epsilon: 0.0,
        }
    }
}

/// A chosen move and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub mv: Move,
    pub source: MoveSource,
    /// Search score from the side to move's point of view
    pub score: Option<i32>,
    /// Learned value of the move, when the learned stage chose it
    pub q_value: Option<f64>,
}

impl Decision {
    pub fn uci(&self) -> String {
        move_to_uci(&self.mv)
    }
}

/// One line of the decision log
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRecord {
    pub ply: u32,
    pub fen: String,
    pub uci: String,
    pub source: MoveSource,
    pub opening: Option<&'static str>,
}

/// Summary of a game played by [`HybridAgent::play_game`]
#[derive(Debug, Clone, PartialEq)]
pub struct GameReport {
    /// `None` when the ply limit was reached first
    pub outcome: Option<GameOutcome>,
    pub record: String,
    pub moves: Vec<String>,
    pub decisions: Vec<DecisionRecord>,
}

#[derive(Debug)]
pub struct HybridAgent {
    config: PipelineConfig,
    book: OpeningBook,
    learner: QLearningAgent,
    search: SearchEngine,
    rng: StdRng,
    log: Vec<DecisionRecord>,
}

impl HybridAgent {
    pub fn new(
        config: PipelineConfig,
        book: OpeningBook,
        learner: QLearningAgent,
        search: SearchEngine,
        rng: StdRng,
    ) -> Self {
        Self {
            config,
            book,
            learner,
            search,
            rng,
            log: Vec::new(),
        }
    }

    /// Build every stage from one configuration
    ///
    /// # Errors
    ///
    /// Fails when the configured Polyglot book cannot be loaded.
    pub fn from_config(
        config: &EngineConfig,
        learner: QLearningAgent,
        seed: u64,
    ) -> ChessEngineResult<Self> {
        let book = OpeningBook::new(config.opening.clone())?;
        let search = SearchEngine::with_parts(
            config.search.clone(),
            Evaluator::new(config.evaluation),
            TranspositionTable::with_size_mb(config.search.tt_size_mb),
            Box::new(MvvLvaOrdering),
        );
        Ok(Self::new(
            config.pipeline.clone(),
            book,
            learner,
            search,
            StdRng::seed_from_u64(seed),
        ))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn book(&self) -> &OpeningBook {
        &self.book
    }

    pub fn learner(&self) -> &QLearningAgent {
        &self.learner
    }

    pub fn learner_mut(&mut self) -> &mut QLearningAgent {
        &mut self.learner
    }

    pub fn search_engine(&self) -> &SearchEngine {
        &self.search
    }

    pub fn search_engine_mut(&mut self) -> &mut SearchEngine {
        &mut self.search
    }

    pub fn decision_log(&self) -> &[DecisionRecord] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Choose a move for the board's position
    ///
    /// The board is only borrowed mutably for the search and is returned in
    /// the same position.
    ///
    /// # Errors
    ///
    /// [`ChessEngineError::GameOver`] when the game is already finished.
    pub fn decide(&mut self, board: &mut Board) -> ChessEngineResult<Decision> {
        if board.is_game_over() {
            return Err(ChessEngineError::GameOver {
                fen: board.to_fen(),
            });
        }

        let decision = self.run_stages(board)?;
        let record = DecisionRecord {
            ply: board.ply(),
            fen: board.to_fen(),
            uci: decision.uci(),
            source: decision.source,
            opening: opening_name(board),
        };
        debug!(
            "[AGENT] ply {} {} via {} ({})",
            record.ply,
            record.uci,
            record.source,
            record.opening.unwrap_or("unknown opening")
        );
        self.log.push(record);
        Ok(decision)
    }

    fn run_stages(&mut self, board: &mut Board) -> ChessEngineResult<Decision> {
        if self.config.use_book && self.book.in_opening_phase(board) {
            if let Some(mv) = self.book.select(board, &mut self.rng) {
                return Ok(Decision {
                    mv,
                    source: MoveSource::Book,
                    score: None,
                    q_value: None,
                });
            }
        }

        if self.config.use_learned && !self.learner.table().is_empty() {
            let choice = self
                .learner
                .choose_move(board, self.config.play_epsilon, &mut self.rng);
            if let Some(mv) = choice {
                let value = self.learner.q_value(board, &mv);
                // With search disabled the learned move is the last resort
                if value.abs() > self.config.learned_threshold || !self.config.use_search {
                    return Ok(Decision {
                        mv,
                        source: MoveSource::Learned,
                        score: None,
                        q_value: Some(value),
                    });
                }
            }
        }

        if self.config.use_search {
            let result = self.search.search(board)?;
            return Ok(Decision {
                mv: result.best_move,
                source: MoveSource::Search,
                score: Some(result.score),
                q_value: None,
            });
        }

        if let Some(mv) = board.legal_moves().into_iter().next() {
            return Ok(Decision {
                mv,
                source: MoveSource::Search,
                score: None,
                q_value: None,
            });
        }
        Err(ChessEngineError::NoLegalMoves {
            fen: board.to_fen(),
        })
    }

    /// Play a game against itself from `start`
    ///
    /// # Errors
    ///
    /// Propagates decision errors; a finished start position yields an
    /// empty game rather than an error.
    pub fn play_game(&mut self, start: &Board, max_plies: u32) -> ChessEngineResult<GameReport> {
        let mut board = start.clone();
        let first_record = self.log.len();
        let mut moves = Vec::new();

        while !board.is_game_over() && moves.len() < max_plies as usize {
            let decision = self.decide(&mut board)?;
            board.make(&decision.mv)?;
            moves.push(decision.uci());
        }

        let outcome = board.outcome();
        info!(
            "[AGENT] Game finished after {} plies: {}",
            moves.len(),
            outcome.map_or("*", GameOutcome::as_str)
        );
        Ok(GameReport {
            outcome,
            record: board.game_record(),
            moves,
            decisions: self.log[first_record..].to_vec(),
        })
    }
}
