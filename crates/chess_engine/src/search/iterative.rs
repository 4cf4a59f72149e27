//! Iterative deepening search
//!
//! Runs complete alpha-beta passes at increasing depth limits. The result of
//! an iteration interrupted by the time or node budget is discarded, so the
//! returned move always comes from the last depth that finished.

use super::alphabeta::alphabeta;
use super::ordering::{MoveOrdering, MvvLvaOrdering};
use super::{SearchContext, SearchLimits};
use crate::board::{move_to_uci, Board};
use crate::constants::*;
use crate::error::{ChessEngineError, ChessEngineResult};
use crate::evaluation::Evaluator;
use crate::hash::TranspositionTable;
use instant::Instant;
use serde::{Deserialize, Serialize};
use shakmaty::Move;
use std::time::Duration;
use tracing::{debug, info};

/// Search limits and table size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Deepest iteration to run
    pub max_depth: u8,
    /// Wall-clock budget; iterations past depth 1 stop once it expires
    pub time_budget_ms: Option<u64>,
    /// Node budget across all iterations
    pub node_budget: Option<u64>,
    /// Nodes between two reads of the clock
    pub check_interval: u64,
    pub quiescence_depth: u8,
    /// Hard bound on plies from the root, quiescence included
    pub max_ply: usize,
    pub tt_size_mb: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            time_budget_ms: None,
            node_budget: None,
            check_interval: DEFAULT_CHECK_INTERVAL,
            quiescence_depth: DEFAULT_QUIESCENCE_DEPTH,
            max_ply: MAX_PLY,
            tt_size_mb: DEFAULT_TT_SIZE_MB,
        }
    }
}

impl SearchConfig {
    /// Fixed-depth search without time or node limits
    pub fn fixed_depth(max_depth: u8) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }
}

/// Result of one completed search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    /// Score from the side to move's point of view
    pub score: i32,
    /// Nodes visited by all iterations, the aborted one included
    pub nodes: u64,
    /// Deepest iteration that completed
    pub depth: u8,
    /// Principal variation read back from the transposition table
    pub pv: Vec<Move>,
    pub elapsed: Duration,
}

impl SearchResult {
    pub fn best_move_uci(&self) -> String {
        move_to_uci(&self.best_move)
    }

    /// Plies to a forced mate, if the score encodes one
    pub fn mate_distance(&self) -> Option<u32> {
        mate_distance(self.score)
    }
}

/// Iterative-deepening alpha-beta engine
///
/// Owns its transposition table and move-ordering strategy; the board is
/// borrowed for the duration of each search and handed back unchanged.
#[derive(Debug)]
pub struct SearchEngine {
    config: SearchConfig,
    evaluator: Evaluator,
    tt: TranspositionTable,
    ordering: Box<dyn MoveOrdering>,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        let tt = TranspositionTable::with_size_mb(config.tt_size_mb);
        Self::with_parts(config, Evaluator::default(), tt, Box::new(MvvLvaOrdering))
    }

    pub fn with_parts(
        config: SearchConfig,
        evaluator: Evaluator,
        tt: TranspositionTable,
        ordering: Box<dyn MoveOrdering>,
    ) -> Self {
        Self {
            config,
            evaluator,
            tt,
            ordering,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// Search the board's position and return the best move found
    ///
    /// # Errors
    ///
    /// [`ChessEngineError::NoLegalMoves`] when the position has no legal
    /// moves; callers check for a finished game first.
    pub fn search(&mut self, board: &mut Board) -> ChessEngineResult<SearchResult> {
        let root_moves = board.legal_moves();
        let Some(fallback) = root_moves.first().cloned() else {
            return Err(ChessEngineError::NoLegalMoves {
                fen: board.to_fen(),
            });
        };

        self.tt.new_search();
        let start = Instant::now();
        let deadline = self
            .config
            .time_budget_ms
            .map(|ms| start + Duration::from_millis(ms));
        let max_depth = self.config.max_depth.max(1);
        let root_height = board.height();

        let mut total_nodes = 0u64;
        let mut completed: Option<(u8, i32, Move)> = None;

        for depth in 1..=max_depth {
            let limits = SearchLimits {
                deadline,
                node_budget: self
                    .config
                    .node_budget
                    .map(|budget| budget.saturating_sub(total_nodes)),
                check_interval: self.config.check_interval,
                abortable: depth > 1,
                quiescence_depth: self.config.quiescence_depth,
                max_ply: self.config.max_ply,
            };

            let mut ctx = SearchContext::new(
                board,
                &mut self.tt,
                &self.evaluator,
                self.ordering.as_ref(),
                limits,
            );
            let outcome = alphabeta(&mut ctx, depth, -AB_INF, AB_INF);
            let (nodes, aborted) = (ctx.nodes, ctx.aborted);
            drop(ctx);
            if board.height() != root_height {
                board.unwind_to(root_height);
            }
            let (score, best_move) = outcome?;
            total_nodes += nodes;

            if aborted {
                info!(
                    "[SEARCH] Depth {} aborted after {} nodes, keeping depth {}",
                    depth,
                    nodes,
                    completed.as_ref().map_or(0, |(d, _, _)| *d)
                );
                break;
            }

            let best_move = best_move.unwrap_or_else(|| fallback.clone());
            debug!(
                "[SEARCH] Depth {} complete: {} score {} nodes {} ({} ms)",
                depth,
                move_to_uci(&best_move),
                score,
                nodes,
                start.elapsed().as_millis()
            );
            completed = Some((depth, score, best_move));

            // A forced mate for the side to move cannot get any shorter
            if score > MATE_THRESHOLD {
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            if self
                .config
                .node_budget
                .is_some_and(|budget| total_nodes >= budget)
            {
                break;
            }
        }

        let (depth, score, best_move) = completed.ok_or_else(|| ChessEngineError::SearchError {
            message: "no search iteration completed".to_string(),
        })?;
        let pv = self.principal_variation(board, &best_move, depth);
        let result = SearchResult {
            best_move,
            score,
            nodes: total_nodes,
            depth,
            pv,
            elapsed: start.elapsed(),
        };

        let tt_stats = self.tt.stats();
        info!(
            "[SEARCH] Best {} score {} depth {} nodes {} tt hits {}/{} ({} ms)",
            result.best_move_uci(),
            result.score,
            result.depth,
            result.nodes,
            tt_stats.hits,
            tt_stats.probes,
            result.elapsed.as_millis()
        );
        Ok(result)
    }

    /// Best move followed by the table's remembered replies
    fn principal_variation(&self, board: &mut Board, best_move: &Move, depth: u8) -> Vec<Move> {
        let root_height = board.height();
        let mut pv = Vec::new();
        let mut next = Some(best_move.clone());

        while let Some(mv) = next.take() {
            if pv.len() >= usize::from(depth) || board.make(&mv).is_err() {
                break;
            }
            pv.push(mv);
            if board.repetition_count() > 1 {
                break;
            }
            next = self.tt.get(board.key()).and_then(|e| e.best_move.clone());
        }

        board.unwind_to(root_height);
        pv
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}
