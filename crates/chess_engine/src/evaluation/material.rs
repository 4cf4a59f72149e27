//! Material evaluation
//!
//! Evaluates the material balance of a position by counting piece values.

use super::Mailbox;
use crate::constants::*;
use shakmaty::{Color, Role};

/// Material balance (positive favours White)
pub fn evaluate_material(mailbox: &Mailbox) -> i32 {
    mailbox
        .iter()
        .flatten()
        .map(|piece| {
            let value = role_value(piece.role);
            match piece.color {
                Color::White => value,
                Color::Black => -value,
            }
        })
        .sum()
}

/// Material of `color` excluding pawns and king
pub fn non_pawn_material(mailbox: &Mailbox, color: Color) -> i32 {
    mailbox
        .iter()
        .flatten()
        .filter(|piece| piece.color == color && piece.role != Role::Pawn)
        .map(|piece| role_value(piece.role))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::evaluation::mailbox;

    #[test]
    fn test_starting_position_material_balance() {
        let board = Board::new();
        let score = evaluate_material(&mailbox(board.position()));
        assert_eq!(score, 0, "Starting position should have 0 material balance");
    }

    #[test]
    fn test_white_up_queen() {
        let board = Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        let score = evaluate_material(&mailbox(board.position()));
        assert_eq!(score, QUEEN_VALUE);
    }

    #[test]
    fn test_black_up_pawn() {
        let board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        let score = evaluate_material(&mailbox(board.position()));
        assert_eq!(score, -PAWN_VALUE);
    }

    #[test]
    fn test_non_pawn_material() {
        let board = Board::new();
        let mb = mailbox(board.position());
        let expected = 2 * KNIGHT_VALUE + 2 * BISHOP_VALUE + 2 * ROOK_VALUE + QUEEN_VALUE;
        assert_eq!(non_pawn_material(&mb, Color::White), expected);
        assert_eq!(non_pawn_material(&mb, Color::Black), expected);
    }
}
