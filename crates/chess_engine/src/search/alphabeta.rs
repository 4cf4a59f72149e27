//! Alpha-beta search with negamax (iterative version, no recursion)
//!
//! Uses an explicit stack of frames to simulate recursive calls, so the call
//! stack stays flat whatever the search depth. Every move made for a child
//! frame is unmade when the child's score is consumed, or by unwinding the
//! board to the root height when the search is aborted.

use super::quiescence::quiescence_search;
use super::SearchContext;
use crate::constants::*;
use crate::error::{ChessEngineError, ChessEngineResult};
use crate::hash::{bound_for, Probe};
use shakmaty::Move;

/// Stack frame for iterative alphabeta search
///
/// Each frame represents one "recursive call" of the negamax recursion.
struct SearchFrame {
    depth: u8,
    ply: usize,
    alpha: i32,
    /// Window lower edge once the moves start, used to classify the result
    window_alpha: i32,
    beta: i32,
    moves: Vec<Move>,
    move_index: usize,
    best_score: i32,
    best_move: Option<Move>,
    initialized: bool,
    /// Score of the child just searched, from the child's point of view
    returning_score: Option<i32>,
}

impl SearchFrame {
    fn new(depth: u8, ply: usize, alpha: i32, beta: i32) -> Self {
        Self {
            depth,
            ply,
            alpha,
            window_alpha: alpha,
            beta,
            moves: Vec::new(),
            move_index: 0,
            best_score: -AB_INF,
            best_move: None,
            initialized: false,
            returning_score: None,
        }
    }
}

/// Outcome of the first visit to a frame
enum Entry {
    /// Node settled without searching children
    Score(i32),
    /// Children must be searched
    Expand,
}

/// Negamax alpha-beta from the current board position
///
/// Returns the fail-soft score from the side to move's point of view and the
/// best root move. When the search is aborted the board is restored to the
/// root and the returned values are meaningless; callers check
/// `ctx.aborted`.
///
/// # Errors
///
/// Returns an error if the root has no legal moves or the frame stack is
/// corrupted.
pub(crate) fn alphabeta(
    ctx: &mut SearchContext<'_>,
    depth: u8,
    alpha: i32,
    beta: i32,
) -> ChessEngineResult<(i32, Option<Move>)> {
    let mut stack: Vec<SearchFrame> = vec![SearchFrame::new(depth, 0, alpha, beta)];

    while let Some(frame) = stack.last_mut() {
        if ctx.aborted {
            ctx.board.unwind_to(ctx.root_height);
            return Ok((0, None));
        }

        // === PHASE 1: Frame initialization (first visit) ===
        if !frame.initialized {
            frame.initialized = true;
            match enter_node(ctx, frame)? {
                Entry::Expand => continue,
                Entry::Score(score) => {
                    stack.pop();
                    match stack.last_mut() {
                        Some(parent) => parent.returning_score = Some(score),
                        None => return Ok((score, None)),
                    }
                    continue;
                }
            }
        }

        // === PHASE 2: Process returning score from child ===
        if let Some(child_score) = frame.returning_score.take() {
            ctx.board.unmake()?;

            let score = -child_score;
            if score > frame.best_score {
                frame.best_score = score;
                frame.best_move = frame
                    .move_index
                    .checked_sub(1)
                    .and_then(|i| frame.moves.get(i))
                    .cloned();
            }
            frame.alpha = frame.alpha.max(score);

            // Beta cutoff: skip the remaining moves
            if frame.alpha >= frame.beta {
                frame.move_index = frame.moves.len();
            }
        }

        // === PHASE 3: Try next move ===
        if frame.move_index < frame.moves.len() {
            let mv = frame.moves[frame.move_index].clone();
            frame.move_index += 1;
            let child = SearchFrame::new(
                frame.depth - 1,
                frame.ply + 1,
                -frame.beta,
                -frame.alpha,
            );
            ctx.board.make_unchecked(&mv);
            stack.push(child);
            continue;
        }

        // === PHASE 4: All moves processed - return result ===
        let bound = bound_for(frame.best_score, frame.window_alpha, frame.beta);
        ctx.tt.store(
            ctx.board.key(),
            frame.depth,
            frame.ply,
            frame.best_score,
            bound,
            frame.best_move.clone(),
        );

        let score = frame.best_score;
        let best_move = frame.best_move.take();
        stack.pop();
        match stack.last_mut() {
            Some(parent) => parent.returning_score = Some(score),
            None => return Ok((score, best_move)),
        }
    }

    Err(ChessEngineError::SearchError {
        message: format!("alphabeta: stack became empty unexpectedly at depth {depth}"),
    })
}

/// First visit to a node: terminal and draw checks, leaf evaluation,
/// transposition probe and move generation
///
/// A returned score is from the point of view of the side to move at the node.
fn enter_node(ctx: &mut SearchContext<'_>, frame: &mut SearchFrame) -> ChessEngineResult<Entry> {
    if ctx.visit() {
        return Ok(Entry::Score(0));
    }
    let root = frame.ply == 0;

    // The root always searches its moves; repetitions below it are draws
    if !root
        && (ctx.board.repetition_count() > 1
            || ctx.board.is_fifty_move_draw()
            || ctx.board.is_insufficient_material())
    {
        return Ok(Entry::Score(0));
    }

    let mut moves = ctx.board.legal_moves();
    if moves.is_empty() {
        if root {
            return Err(ChessEngineError::NoLegalMoves {
                fen: ctx.board.to_fen(),
            });
        }
        let score = if ctx.board.is_check() {
            mated_in(frame.ply)
        } else {
            0
        };
        return Ok(Entry::Score(score));
    }

    if frame.depth == 0 || frame.ply >= ctx.limits.max_ply {
        let score = quiescence_search(ctx, frame.alpha, frame.beta, frame.ply, 0)?;
        return Ok(Entry::Score(score));
    }

    let key = ctx.board.key();
    let tt_move = if root {
        ctx.tt.get(key).and_then(|entry| entry.best_move.clone())
    } else {
        match ctx.tt.probe(key, frame.depth, frame.ply, frame.alpha, frame.beta) {
            Probe::Cutoff(score) => return Ok(Entry::Score(score)),
            Probe::Continue {
                alpha,
                beta,
                best_move,
            } => {
                frame.alpha = alpha;
                frame.beta = beta;
                best_move
            }
        }
    };
    frame.window_alpha = frame.alpha;

    ctx.ordering.order(ctx.board, &mut moves, tt_move.as_ref());
    frame.moves = moves;
    Ok(Entry::Expand)
}

