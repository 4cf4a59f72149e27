//! Position evaluation with piece-square tables
//!
//! Evaluates chess positions using:
//! - Material count (piece values)
//! - Positional bonuses (piece-square tables)
//! - Mobility (number of legal moves)
//! - Centre control
//! - King safety
//!
//! Scores are colour-absolute centipawns: positive favours White. The
//! evaluation is a pure function of the position, so evaluating the
//! colour-mirrored position yields exactly the negated score.
//!
//! ## Module Organization
//!
//! - `pst` - Piece-square tables for positional evaluation
//! - `material` - Material balance evaluation
//! - `position` - Mobility, centre control and king safety

mod material;
mod position;
mod pst;

pub use material::{evaluate_material, non_pawn_material};

use crate::board::Board;
use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, Piece, Position, Square};

/// Piece placement indexed a1 = 0 .. h8 = 63
pub type Mailbox = [Option<Piece>; 64];

/// Snapshot of the piece placement
pub fn mailbox(position: &Chess) -> Mailbox {
    let board = position.board();
    let mut squares = [None; 64];
    for (index, slot) in squares.iter_mut().enumerate() {
        *slot = board.piece_at(Square::new(index as u32));
    }
    squares
}

/// Weights of the positional terms in centipawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    /// Per legal move of difference
    pub mobility: i32,
    /// Per piece on d4/e4/d5/e5
    pub center_occupancy: i32,
    /// Per non-king piece on the ring around the centre
    pub extended_center_occupancy: i32,
    /// Per central square attacked by a pawn
    pub center_attack: i32,
    /// Per missing pawn in front of a king on its home rank
    pub pawn_shield: i32,
    /// Per file on or next to the king without own pawns
    pub open_file: i32,
    /// Side to move is in check
    pub check_penalty: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            mobility: 5,
            center_occupancy: 20,
            extended_center_occupancy: 5,
            center_attack: 10,
            pawn_shield: 12,
            open_file: 15,
            check_penalty: 40,
        }
    }
}

/// Static evaluator: weighted sum of material and positional terms
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    weights: EvalWeights,
}

impl Evaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    /// Colour-absolute score of the board (positive favours White)
    pub fn evaluate(&self, board: &Board) -> i32 {
        self.evaluate_chess(board.position())
    }

    /// Score from the point of view of the side to move
    pub fn evaluate_relative(&self, board: &Board) -> i32 {
        let score = self.evaluate(board);
        match board.turn() {
            Color::White => score,
            Color::Black => -score,
        }
    }

    pub(crate) fn evaluate_chess(&self, position: &Chess) -> i32 {
        let squares = mailbox(position);
        let mut score = evaluate_material(&squares);

        for (index, piece) in squares.iter().enumerate() {
            if let Some(piece) = piece {
                score += pst::pst_value(*piece, index);
            }
        }

        score += position::mobility(position, &self.weights);
        score += position::center_control(&squares, &self.weights);
        score += position::king_safety(position, &squares, &self.weights);
        score
    }
}

/// Evaluate with default weights
pub fn evaluate_position(board: &Board) -> i32 {
    Evaluator::default().evaluate(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITIONS: [&str; 6] = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3",
        "r3k2r/ppp2ppp/2n5/3pP3/1b6/2N2N2/PPP2PPP/R3K2R w Kq d6 0 10",
        "6k1/5ppp/8/8/8/8/5PPP/3R2K1 b - - 0 30",
        "4k3/8/8/8/8/8/8/4K2r w - - 0 1",
        "r2q1rk1/pp2bppp/2n1pn2/3p4/3P4/2NBPN2/PP3PPP/R2Q1RK1 w - - 4 11",
    ];

    #[test]
    fn test_start_position_is_balanced() {
        assert_eq!(evaluate_position(&Board::new()), 0);
    }

    #[test]
    fn test_mirror_negates_score() {
        let evaluator = Evaluator::default();
        for fen in POSITIONS {
            let board = Board::from_fen(fen).unwrap();
            let mirrored = board.mirror().unwrap();
            assert_eq!(
                evaluator.evaluate(&mirrored),
                -evaluator.evaluate(&board),
                "antisymmetry broken for {fen}"
            );
        }
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let evaluator = Evaluator::default();
        let board = Board::from_fen(POSITIONS[2]).unwrap();
        assert_eq!(evaluator.evaluate(&board), evaluator.evaluate(&board));
    }

    #[test]
    fn test_extra_material_dominates() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(evaluate_position(&board) > 800);
        assert!(Evaluator::default().evaluate_relative(&board) > 800);
    }

    #[test]
    fn test_relative_score_flips_for_black() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        let evaluator = Evaluator::default();
        assert_eq!(evaluator.evaluate_relative(&board), -evaluator.evaluate(&board));
    }
}
