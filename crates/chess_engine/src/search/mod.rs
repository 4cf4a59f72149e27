//! Alpha-beta search with iterative deepening
//!
//! This module implements the core search using:
//! - Negamax variant of alpha-beta pruning (explicit frame stack, no recursion)
//! - Quiescence search at the leaves
//! - Iterative deepening for time management
//! - Transposition table for caching
//! - Pluggable move ordering
//!
//! ## Module Organization
//!
//! - `alphabeta` - Core alpha-beta search algorithm
//! - `quiescence` - Quiescence search to avoid horizon effect
//! - `ordering` - Move ordering strategies
//! - `iterative` - Iterative deepening driver and configuration

mod alphabeta;
mod iterative;
mod ordering;
mod quiescence;

pub use iterative::{SearchConfig, SearchEngine, SearchResult};
pub use ordering::{GenerationOrder, MoveOrdering, MvvLvaOrdering};

use crate::board::Board;
use crate::evaluation::Evaluator;
use crate::hash::TranspositionTable;
use instant::Instant;

/// Budgets enforced while one depth iteration runs
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchLimits {
    pub deadline: Option<Instant>,
    /// Nodes this iteration may visit before aborting
    pub node_budget: Option<u64>,
    pub check_interval: u64,
    /// False for the first iteration, which always completes
    pub abortable: bool,
    pub quiescence_depth: u8,
    pub max_ply: usize,
}

/// Mutable state shared by the alpha-beta and quiescence routines
pub(crate) struct SearchContext<'a> {
    pub board: &'a mut Board,
    pub tt: &'a mut TranspositionTable,
    pub evaluator: &'a Evaluator,
    pub ordering: &'a dyn MoveOrdering,
    pub limits: SearchLimits,
    pub nodes: u64,
    pub aborted: bool,
    /// Board height at the root; the board is unwound to it on abort
    pub root_height: usize,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        board: &'a mut Board,
        tt: &'a mut TranspositionTable,
        evaluator: &'a Evaluator,
        ordering: &'a dyn MoveOrdering,
        limits: SearchLimits,
    ) -> Self {
        let root_height = board.height();
        Self {
            board,
            tt,
            evaluator,
            ordering,
            limits,
            nodes: 0,
            aborted: false,
            root_height,
        }
    }

    /// Count a visited node and report whether the search must stop
    ///
    /// The wall clock is only read every `check_interval` nodes.
    pub fn visit(&mut self) -> bool {
        self.nodes += 1;
        if self.aborted || !self.limits.abortable {
            return self.aborted;
        }
        if let Some(budget) = self.limits.node_budget {
            if self.nodes > budget {
                self.aborted = true;
            }
        }
        if self.nodes % self.limits.check_interval.max(1) == 0 {
            if let Some(deadline) = self.limits.deadline {
                if Instant::now() >= deadline {
                    self.aborted = true;
                }
            }
        }
        self.aborted
    }
}
