//! Positional terms: mobility, centre control and king safety
//!
//! Every term returns a colour-absolute score (positive favours White) and is
//! symmetric under colour mirroring.

use super::material::non_pawn_material;
use super::{EvalWeights, Mailbox};
use crate::constants::*;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, FromSetup, Piece, Position, Role};

const CENTER: [usize; 4] = [27, 28, 35, 36];
const EXTENDED_CENTER: [usize; 12] = [18, 19, 20, 21, 26, 29, 34, 37, 42, 43, 44, 45];

/// King safety only matters while the attacker keeps a rook and a minor piece
const KING_SAFETY_MATERIAL: i32 = ROOK_VALUE + KNIGHT_VALUE;

#[inline]
fn sign(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// Legal-move difference between White and Black
///
/// The side not to move is counted on the same placement with the turn
/// flipped. When that position is invalid (the side to move is in check)
/// the opponent counts zero moves.
pub(crate) fn mobility(position: &Chess, weights: &EvalWeights) -> i32 {
    let own = position.legal_moves().len() as i32;
    let mut setup = position.clone().into_setup(EnPassantMode::Legal);
    setup.turn = !setup.turn;
    setup.ep_square = None;
    let other = Chess::from_setup(setup, CastlingMode::Standard)
        .map(|flipped| flipped.legal_moves().len() as i32)
        .unwrap_or(0);
    sign(position.turn()) * (own - other) * weights.mobility
}

fn pawn_attacks(square: usize, color: Color) -> impl Iterator<Item = usize> {
    let file = (square % 8) as i32;
    let rank = (square / 8) as i32;
    let forward = match color {
        Color::White => 1,
        Color::Black => -1,
    };
    [-1, 1].into_iter().filter_map(move |df| {
        let f = file + df;
        let r = rank + forward;
        ((0..8).contains(&f) && (0..8).contains(&r)).then_some((r * 8 + f) as usize)
    })
}

/// Centre occupancy plus pawn control of the four central squares
pub(crate) fn center_control(mailbox: &Mailbox, weights: &EvalWeights) -> i32 {
    let mut score = 0;
    for &sq in &CENTER {
        if let Some(piece) = mailbox[sq] {
            score += sign(piece.color) * weights.center_occupancy;
        }
    }
    for &sq in &EXTENDED_CENTER {
        if let Some(piece) = mailbox[sq] {
            if piece.role != Role::King {
                score += sign(piece.color) * weights.extended_center_occupancy;
            }
        }
    }
    for (sq, piece) in mailbox.iter().enumerate() {
        if let Some(Piece { color, role: Role::Pawn }) = *piece {
            let controlled = pawn_attacks(sq, color)
                .filter(|target| CENTER.contains(target))
                .count() as i32;
            score += sign(color) * controlled * weights.center_attack;
        }
    }
    score
}

fn has_own_pawn(mailbox: &Mailbox, color: Color, file: i32, rank: i32) -> bool {
    if !(0..8).contains(&file) || !(0..8).contains(&rank) {
        return false;
    }
    matches!(
        mailbox[(rank * 8 + file) as usize],
        Some(Piece { color: c, role: Role::Pawn }) if c == color
    )
}

/// Penalty (positive number) for an exposed `color` king
fn king_danger(mailbox: &Mailbox, color: Color, weights: &EvalWeights) -> i32 {
    if non_pawn_material(mailbox, !color) < KING_SAFETY_MATERIAL {
        return 0;
    }
    let Some(king) = mailbox.iter().position(|p| {
        matches!(p, Some(Piece { color: c, role: Role::King }) if *c == color)
    }) else {
        return 0;
    };
    let king_file = (king % 8) as i32;
    let king_rank = (king / 8) as i32;
    let (home_rank, forward) = match color {
        Color::White => (0, 1),
        Color::Black => (7, -1),
    };

    let mut danger = 0;
    for file in (king_file - 1)..=(king_file + 1) {
        if !(0..8).contains(&file) {
            continue;
        }
        if king_rank == home_rank
            && !has_own_pawn(mailbox, color, file, home_rank + forward)
            && !has_own_pawn(mailbox, color, file, home_rank + 2 * forward)
        {
            danger += weights.pawn_shield;
        }
        if !(0..8).any(|rank| has_own_pawn(mailbox, color, file, rank)) {
            danger += weights.open_file;
        }
    }
    danger
}

/// King safety balance including a penalty for the side to move being in check
pub(crate) fn king_safety(
    position: &Chess,
    mailbox: &Mailbox,
    weights: &EvalWeights,
) -> i32 {
    let mut score = king_danger(mailbox, Color::Black, weights)
        - king_danger(mailbox, Color::White, weights);
    if position.is_check() {
        score -= sign(position.turn()) * weights.check_penalty;
    }
    score
}
