//! # Chess Engine Constants - Evaluation Values & Search Parameters
//!
//! ## Overview
//!
//! This module centralizes the constant values used throughout the engine: piece valuations in
//! centipawns, the mate-score scale used by the search, and the default tuning of the search,
//! learning and opening stages. Every default here can be overridden through the matching
//! configuration struct in [`crate::config`].
//!
//! ## Centipawn Valuation System
//!
//! Scores are integer **centipawns** (1/100th of a pawn):
//!
//! - **Pawn**: 100
//! - **Knight**: 320
//! - **Bishop**: 330
//! - **Rook**: 500
//! - **Queen**: 900
//! - **King**: not counted in material (it can never leave the board)
//!
//! The slightly higher bishop value encodes the bishop pair tendency without a separate term.
//!
//! ## Mate Scores
//!
//! A side that is checkmated at `ply` plies from the root scores `-(MATE_SCORE - ply)`. Shorter
//! mates therefore get larger magnitudes, and any score beyond [`MATE_THRESHOLD`] is a forced mate.
//! The transposition table stores mate scores relative to the node, see [`crate::hash`].

use shakmaty::Role;

pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;
pub const KING_VALUE: i32 = 0;

/// Larger than any reachable evaluation
pub const AB_INF: i32 = 32_000;
pub const MATE_SCORE: i32 = 30_000;

/// Hard bound on the search stack (plies from the root, quiescence included)
pub const MAX_PLY: usize = 64;

/// Scores with larger magnitude encode a forced mate
pub const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;

pub const DEFAULT_MAX_DEPTH: u8 = 4;
pub const DEFAULT_QUIESCENCE_DEPTH: u8 = 6;
pub const DEFAULT_CHECK_INTERVAL: u64 = 1_024;
pub const DEFAULT_TT_SIZE_MB: usize = 16;

pub const DEFAULT_MAX_OPENING_PLIES: u32 = 20;

pub const DEFAULT_ALPHA: f64 = 0.3;
pub const DEFAULT_GAMMA: f64 = 0.95;
pub const DEFAULT_EPSILON: f64 = 1.0;
pub const DEFAULT_EPSILON_DECAY: f64 = 0.995;
pub const DEFAULT_EPSILON_MIN: f64 = 0.05;
pub const DEFAULT_MAX_EPISODE_PLIES: u32 = 200;
/// Capture reward per pawn unit of the captured piece
pub const DEFAULT_CAPTURE_REWARD_SCALE: f64 = 0.1;

pub const DEFAULT_LEARNED_THRESHOLD: f64 = 0.05;

pub const WIN_REWARD: f64 = 1.0;
pub const DRAW_REWARD: f64 = 0.0;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Material value of a role in centipawns
#[inline]
pub fn role_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => KING_VALUE,
    }
}

/// Ordinal rank of a role for MVV-LVA ordering (pawn lowest, king highest)
#[inline]
pub fn piece_rank(role: Role) -> i32 {
    match role {
        Role::Pawn => 1,
        Role::Knight => 2,
        Role::Bishop => 3,
        Role::Rook => 4,
        Role::Queen => 5,
        Role::King => 6,
    }
}

/// Mate score for the side to move being mated at `ply`
#[inline]
pub fn mated_in(ply: usize) -> i32 {
    -MATE_SCORE + ply as i32
}

/// True when `score` encodes a forced mate for either side
#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() > MATE_THRESHOLD
}

/// Plies to mate encoded in a mate score
#[inline]
pub fn mate_distance(score: i32) -> Option<u32> {
    is_mate_score(score).then(|| (MATE_SCORE - score.abs()) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_scores_prefer_shorter_mates() {
        assert!(-mated_in(1) > -mated_in(3));
        assert!(is_mate_score(mated_in(5)));
        assert!(!is_mate_score(QUEEN_VALUE * 9));
    }

    #[test]
    fn test_mate_distance_round_trip() {
        assert_eq!(mate_distance(-mated_in(3)), Some(3));
        assert_eq!(mate_distance(mated_in(2)), Some(2));
        assert_eq!(mate_distance(150), None);
    }

    #[test]
    fn test_piece_rank_orders_roles() {
        assert!(piece_rank(Role::King) > piece_rank(Role::Queen));
        assert!(piece_rank(Role::Pawn) < piece_rank(Role::Knight));
        assert_eq!(role_value(Role::King), 0);
    }
}
