//! Opening repertoire
//!
//! Weighted candidate moves for early-game positions. Candidates come from
//! an optional Polyglot book first, then from the built-in table. A miss
//! (unknown position, or past the opening phase) returns nothing and lets the
//! caller fall through to its next stage.
//!
//! ## Module Organization
//!
//! - `builtin` - Built-in weighted table and opening names
//! - `polyglot` - Polyglot `.bin` reader

mod builtin;
mod polyglot;

pub use polyglot::{encode_move, PolyglotBook, PolyglotEntry};

use crate::board::Board;
use crate::constants::DEFAULT_MAX_OPENING_PLIES;
use crate::error::ChessEngineResult;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shakmaty::Move;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningConfig {
    /// Book is consulted while the game ply is at most this value
    pub max_opening_plies: u32,
    /// Sample candidates by weight instead of always taking the heaviest
    pub weighted: bool,
    pub polyglot_path: Option<PathBuf>,
}

impl Default for OpeningConfig {
    fn default() -> Self {
        Self {
            max_opening_plies: DEFAULT_MAX_OPENING_PLIES,
            weighted: true,
            polyglot_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCandidate {
    /// UCI text, checked against the position on lookup
    pub uci: String,
    pub weight: u32,
}

#[derive(Debug, Clone)]
pub struct OpeningBook {
    config: OpeningConfig,
    entries: HashMap<u64, Vec<BookCandidate>>,
    polyglot: Option<PolyglotBook>,
}

impl OpeningBook {
    /// Built-in table plus the configured Polyglot file, if any
    ///
    /// # Errors
    ///
    /// Fails when the Polyglot file cannot be read or is malformed.
    pub fn new(config: OpeningConfig) -> ChessEngineResult<Self> {
        let polyglot = match &config.polyglot_path {
            Some(path) => {
                let book = PolyglotBook::open(path)?;
                info!(
                    "[BOOK] Polyglot book loaded from {} ({} entries)",
                    path.display(),
                    book.len()
                );
                Some(book)
            }
            None => None,
        };

        let mut book = Self::empty(config);
        for (fen, moves) in builtin::BUILTIN_LINES {
            let board = Board::from_fen(fen)?;
            for (uci, weight) in moves.iter() {
                book.insert(&board, uci, *weight);
            }
        }
        book.polyglot = polyglot;
        debug!("[BOOK] Built-in table holds {} positions", book.entries.len());
        Ok(book)
    }

    /// Book without any entries
    pub fn empty(config: OpeningConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            polyglot: None,
        }
    }

    pub fn with_polyglot(mut self, book: PolyglotBook) -> Self {
        self.polyglot = Some(book);
        self
    }

    pub fn config(&self) -> &OpeningConfig {
        &self.config
    }

    /// Add a weighted candidate for the board's position
    pub fn insert(&mut self, board: &Board, uci: &str, weight: u32) {
        self.entries
            .entry(board.key())
            .or_default()
            .push(BookCandidate {
                uci: uci.to_string(),
                weight,
            });
    }

    /// Number of positions in the built-in table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.polyglot.as_ref().is_none_or(PolyglotBook::is_empty)
    }

    pub fn in_opening_phase(&self, board: &Board) -> bool {
        board.ply() <= self.config.max_opening_plies
    }

    /// Legal weighted candidates for the position
    ///
    /// Empty outside the opening phase or when the position is unknown.
    pub fn candidates(&self, board: &Board) -> Vec<(Move, u32)> {
        if !self.in_opening_phase(board) {
            return Vec::new();
        }
        if let Some(polyglot) = &self.polyglot {
            let found = polyglot.candidates(board);
            if !found.is_empty() {
                return found;
            }
        }
        self.entries
            .get(&board.key())
            .map(|candidates| {
                candidates
                    .iter()
                    .filter_map(|c| board.parse_uci(&c.uci).ok().map(|mv| (mv, c.weight)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pick a book move: weighted sample or heaviest candidate
    pub fn select<R: Rng + ?Sized>(&self, board: &Board, rng: &mut R) -> Option<Move> {
        let candidates = self.candidates(board);
        if candidates.is_empty() {
            return None;
        }
        let total: u64 = candidates.iter().map(|(_, w)| u64::from(*w)).sum();
        if self.config.weighted && total > 0 {
            let mut pick = rng.random_range(0..total);
            for (mv, weight) in &candidates {
                let weight = u64::from(*weight);
                if pick < weight {
                    return Some(mv.clone());
                }
                pick -= weight;
            }
        }
        heaviest(candidates)
    }
}

/// First candidate with the largest weight
fn heaviest(candidates: Vec<(Move, u32)>) -> Option<Move> {
    let mut best: Option<(Move, u32)> = None;
    for (mv, weight) in candidates {
        if best.as_ref().is_none_or(|(_, w)| weight > *w) {
            best = Some((mv, weight));
        }
    }
    best.map(|(mv, _)| mv)
}

/// Name of the opening played on the board, from its move history
pub fn opening_name(board: &Board) -> Option<&'static str> {
    let history = board.move_history();
    if history.is_empty() {
        return Some("Starting position");
    }
    builtin::OPENING_NAMES
        .iter()
        .find(|(prefix, _)| {
            history.len() >= prefix.len()
                && prefix.iter().zip(&history).all(|(a, b)| *a == b.as_str())
        })
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::move_to_uci;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shakmaty::Square;

    fn fixed() -> OpeningConfig {
        OpeningConfig {
            weighted: false,
            ..OpeningConfig::default()
        }
    }

    #[test]
    fn test_single_entry_unweighted_always_returns_it() {
        let board = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        let mut book = OpeningBook::empty(fixed());
        book.insert(&board, "e2e3", 7);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let mv = book.select(&board, &mut rng).unwrap();
            assert_eq!(move_to_uci(&mv), "e2e3");
        }
    }

    #[test]
    fn test_unweighted_picks_heaviest() {
        let book = OpeningBook::new(fixed()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mv = book.select(&Board::new(), &mut rng).unwrap();
        assert_eq!(move_to_uci(&mv), "e2e4");
    }

    #[test]
    fn test_weighted_sampling_follows_weights() {
        let book = OpeningBook::new(OpeningConfig::default()).unwrap();
        let board = Board::new();
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<String, u32> = HashMap::new();
        for _ in 0..2_000 {
            let mv = book.select(&board, &mut rng).unwrap();
            *counts.entry(move_to_uci(&mv)).or_default() += 1;
        }
        assert_eq!(counts.len(), 4);
        assert!(counts["e2e4"] > counts["c2c4"]);
        assert!(counts["d2d4"] > counts["g1f3"]);
    }

    #[test]
    fn test_book_lines_reachable_by_moves() {
        let book = OpeningBook::new(fixed()).unwrap();
        let mut board = Board::new();
        for mv in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"] {
            board.make_uci(mv).unwrap();
        }
        let candidates = book.candidates(&board);
        assert_eq!(candidates.len(), 5);
        assert_eq!(opening_name(&board), Some("Ruy Lopez"));
    }

    #[test]
    fn test_miss_past_opening_phase() {
        let config = OpeningConfig {
            max_opening_plies: 0,
            ..fixed()
        };
        let book = OpeningBook::new(config).unwrap();
        let mut board = Board::new();
        assert!(book.candidates(&board).len() == 4);
        board.make_uci("e2e4").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(book.select(&board, &mut rng).is_none());
    }

    #[test]
    fn test_unknown_position_misses() {
        let book = OpeningBook::new(fixed()).unwrap();
        let board = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(book.select(&board, &mut rng).is_none());
    }

    #[test]
    fn test_illegal_candidates_are_discarded() {
        let board = Board::new();
        let mut book = OpeningBook::empty(fixed());
        book.insert(&board, "e2e5", 100);
        book.insert(&board, "g1f3", 1);
        let mut rng = StdRng::seed_from_u64(0);
        let mv = book.select(&board, &mut rng).unwrap();
        assert_eq!(move_to_uci(&mv), "g1f3");
    }

    #[test]
    fn test_polyglot_takes_precedence() {
        let board = Board::new();
        let polyglot = PolyglotBook::from_entries(vec![PolyglotEntry {
            key: board.key(),
            raw_move: encode_move(Square::B1, Square::C3, None),
            weight: 1,
            learn: 0,
        }]);
        let book = OpeningBook::new(fixed()).unwrap().with_polyglot(polyglot);
        let mut rng = StdRng::seed_from_u64(0);
        let mv = book.select(&board, &mut rng).unwrap();
        assert_eq!(move_to_uci(&mv), "b1c3");
    }

    #[test]
    fn test_opening_names() {
        let mut board = Board::new();
        assert_eq!(opening_name(&board), Some("Starting position"));
        board.make_uci("c2c4").unwrap();
        assert_eq!(opening_name(&board), Some("English Opening"));

        let mut board = Board::new();
        board.make_uci("g1f3").unwrap();
        assert_eq!(opening_name(&board), None);
    }
}
