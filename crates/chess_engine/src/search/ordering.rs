//! Move ordering for alpha-beta pruning
//!
//! Orders moves to maximize alpha-beta pruning efficiency by trying
//! the most promising moves first. The strategy is pluggable so tests can
//! compare heuristics against plain generation order.

use crate::board::Board;
use crate::constants::*;
use shakmaty::Move;
use std::cmp::Reverse;

/// Strategy that reorders the moves of a node before they are searched
pub trait MoveOrdering: std::fmt::Debug + Send + Sync {
    /// Reorder `moves` in place. `tt_move` is the best move remembered by the
    /// transposition table for this position, if any.
    fn order(&self, board: &Board, moves: &mut [Move], tt_move: Option<&Move>);
}

/// Transposition-table move first, then captures by MVV-LVA, then the
/// remaining moves in generation order
#[derive(Debug, Clone, Copy, Default)]
pub struct MvvLvaOrdering;

impl MvvLvaOrdering {
    fn score(mv: &Move, tt_move: Option<&Move>) -> i32 {
        if tt_move == Some(mv) {
            return i32::MAX;
        }
        match mv.capture() {
            // Most valuable victim, least valuable attacker
            Some(victim) => role_value(victim) * 10 - piece_rank(mv.role()),
            None => 0,
        }
    }
}

impl MoveOrdering for MvvLvaOrdering {
    fn order(&self, _board: &Board, moves: &mut [Move], tt_move: Option<&Move>) {
        // Stable sort keeps generation order among equal keys
        moves.sort_by_key(|mv| Reverse(Self::score(mv, tt_move)));
    }
}

/// Leaves moves in the order the rules engine generated them
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationOrder;

impl MoveOrdering for GenerationOrder {
    fn order(&self, _board: &Board, _moves: &mut [Move], _tt_move: Option<&Move>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::move_to_uci;

    fn ordered(fen: &str, tt_move: Option<&str>) -> Vec<String> {
        let board = Board::from_fen(fen).unwrap();
        let tt = tt_move.map(|uci| board.parse_uci(uci).unwrap());
        let mut moves = board.legal_moves();
        MvvLvaOrdering.order(&board, &mut moves, tt.as_ref());
        moves.iter().map(move_to_uci).collect()
    }

    #[test]
    fn test_order_moves_prioritizes_captures() {
        // e4 pawn can take the d5 queen
        let moves = ordered("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1", None);
        assert_eq!(moves[0], "e4d5", "Capture should be ordered first");
    }

    #[test]
    fn test_order_moves_mvv_lva() {
        // PxQ on d5 and QxP on d4 are both available
        let moves = ordered("4k3/8/8/3q4/3pP3/4Q3/8/4K3 w - - 0 1", None);
        let pxq = moves.iter().position(|m| m == "e4d5").unwrap();
        let qxp = moves.iter().position(|m| m == "e3d4").unwrap();
        assert!(pxq < qxp, "Pawn capturing queen should come first");
    }

    #[test]
    fn test_tt_move_comes_first() {
        let moves = ordered("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1", Some("e1f2"));
        assert_eq!(moves[0], "e1f2");
        assert_eq!(moves[1], "e4d5");
    }

    #[test]
    fn test_quiet_moves_keep_generation_order() {
        let board = Board::new();
        let generated: Vec<String> = board.legal_moves().iter().map(move_to_uci).collect();
        assert_eq!(ordered(crate::constants::START_FEN, None), generated);
    }

    #[test]
    fn test_generation_order_is_identity() {
        let board = Board::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut moves = board.legal_moves();
        let original = moves.clone();
        GenerationOrder.order(&board, &mut moves, None);
        assert_eq!(moves, original);
    }
}
