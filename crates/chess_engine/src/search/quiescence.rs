//! Quiescence search to avoid horizon effect
//!
//! Extends leaf nodes with tactical moves only: captures and promotions, or
//! every evasion while in check. Recursion is bounded by the configured
//! quiescence depth and by the hard ply limit.

use super::SearchContext;
use crate::constants::*;
use crate::error::ChessEngineResult;

/// Fail-soft quiescence score from the side to move's point of view
///
/// Returns 0 without further work once the search has been aborted; the
/// caller discards the result in that case.
pub(crate) fn quiescence_search(
    ctx: &mut SearchContext<'_>,
    mut alpha: i32,
    beta: i32,
    ply: usize,
    qs_depth: u8,
) -> ChessEngineResult<i32> {
    if ctx.visit() {
        return Ok(0);
    }

    let mut moves = ctx.board.legal_moves();
    let in_check = ctx.board.is_check();
    if moves.is_empty() {
        return Ok(if in_check { mated_in(ply) } else { 0 });
    }
    if ctx.board.is_insufficient_material() {
        return Ok(0);
    }

    let stand_pat = ctx.evaluator.evaluate_relative(ctx.board);
    if qs_depth >= ctx.limits.quiescence_depth || ply >= ctx.limits.max_ply {
        return Ok(stand_pat);
    }

    let mut best_score = if in_check {
        -AB_INF
    } else {
        if stand_pat >= beta {
            return Ok(stand_pat);
        }
        alpha = alpha.max(stand_pat);
        moves.retain(|mv| mv.is_capture() || mv.is_promotion());
        stand_pat
    };

    ctx.ordering.order(ctx.board, &mut moves, None);

    for mv in &moves {
        ctx.board.make_unchecked(mv);
        let score = -quiescence_search(ctx, -beta, -alpha, ply + 1, qs_depth + 1)?;
        ctx.board.unmake()?;
        if ctx.aborted {
            return Ok(0);
        }

        if score > best_score {
            best_score = score;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            break;
        }
    }

    Ok(best_score)
}
