//! Position adapter around the `shakmaty` rules engine
//!
//! Provides the only mutable view of a chess position used by the engine:
//! - Legal move generation and move validation
//! - Paired make/unmake with an explicit undo stack
//! - Terminal-state and draw queries
//! - Stable 64-bit position keys (Polyglot-compatible Zobrist)
//! - FEN and UCI serialization

use crate::error::{ChessEngineError, ChessEngineResult};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position};

/// Final result of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameOutcome {
    /// Result tag as used in game records
    pub fn as_str(self) -> &'static str {
        match self {
            GameOutcome::WhiteWins => "1-0",
            GameOutcome::BlackWins => "0-1",
            GameOutcome::Draw => "1/2-1/2",
        }
    }
}

/// Information needed to undo a move
#[derive(Debug, Clone)]
struct UndoInfo {
    position: Chess,
    key: u64,
    mv: Move,
}

/// Chess position with an undo stack
///
/// Every [`Board::make`] must be matched by exactly one [`Board::unmake`]
/// before the caller that made the move returns. The undo stack doubles as
/// the game history used for repetition detection.
#[derive(Debug, Clone)]
pub struct Board {
    position: Chess,
    key: u64,
    history: Vec<UndoInfo>,
}

impl Default for Board {
    fn default() -> Self {
        Self::from_position(Chess::default())
    }
}

impl Board {
    /// Board at the standard starting position
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing position (no history)
    pub fn from_position(position: Chess) -> Self {
        let key = position_key(&position);
        Self {
            position,
            key,
            history: Vec::new(),
        }
    }

    /// Parse a FEN string
    ///
    /// # Errors
    ///
    /// Returns [`ChessEngineError::InvalidFen`] when the text is not FEN or
    /// describes an illegal setup.
    pub fn from_fen(fen: &str) -> ChessEngineResult<Self> {
        let parsed: Fen = fen.trim().parse().map_err(|e| ChessEngineError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e}"),
        })?;
        let position: Chess =
            parsed
                .into_position(CastlingMode::Standard)
                .map_err(|e| ChessEngineError::InvalidFen {
                    fen: fen.to_string(),
                    reason: format!("{e}"),
                })?;
        Ok(Self::from_position(position))
    }

    /// FEN of the current position (en-passant square only when capturable)
    pub fn to_fen(&self) -> String {
        Fen::from_setup(self.position.clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    /// Underlying rules-engine position
    #[inline]
    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// Stable position key: placement, side to move, castling rights and a
    /// legal en-passant target. Move counters are excluded.
    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// Half-moves played since the standard starting position
    pub fn ply(&self) -> u32 {
        let full = self.position.fullmoves().get();
        (full - 1) * 2 + u32::from(self.turn() == Color::Black)
    }

    /// Number of moves currently on the undo stack
    #[inline]
    pub fn height(&self) -> usize {
        self.history.len()
    }

    /// Legal moves in generation order
    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves().into_iter().collect()
    }

    /// Parse UCI move text against the current position
    ///
    /// # Errors
    ///
    /// [`ChessEngineError::InvalidMoveNotation`] for unparsable text,
    /// [`ChessEngineError::InvalidMove`] for a move that is not legal here.
    pub fn parse_uci(&self, text: &str) -> ChessEngineResult<Move> {
        let uci: UciMove = text
            .trim()
            .parse()
            .map_err(|_| ChessEngineError::InvalidMoveNotation {
                text: text.to_string(),
            })?;
        uci.to_move(&self.position)
            .map_err(|_| ChessEngineError::InvalidMove {
                uci: text.to_string(),
                fen: self.to_fen(),
            })
    }

    /// Play a move after checking it is legal
    ///
    /// # Errors
    ///
    /// Returns [`ChessEngineError::InvalidMove`] when the move is not legal;
    /// the board is left untouched.
    pub fn make(&mut self, mv: &Move) -> ChessEngineResult<()> {
        if !self.position.legal_moves().contains(mv) {
            return Err(ChessEngineError::InvalidMove {
                uci: move_to_uci(mv),
                fen: self.to_fen(),
            });
        }
        self.make_unchecked(mv);
        Ok(())
    }

    /// Parse and play a UCI move
    pub fn make_uci(&mut self, text: &str) -> ChessEngineResult<Move> {
        let mv = self.parse_uci(text)?;
        self.make_unchecked(&mv);
        Ok(mv)
    }

    /// Play a move known to be legal (generated from this position)
    pub(crate) fn make_unchecked(&mut self, mv: &Move) {
        let previous = self.position.clone();
        self.position.play_unchecked(mv);
        self.history.push(UndoInfo {
            position: previous,
            key: self.key,
            mv: mv.clone(),
        });
        self.key = position_key(&self.position);
    }

    /// Undo the most recent move
    ///
    /// # Errors
    ///
    /// Returns [`ChessEngineError::UnmakeWithoutMake`] on an empty stack.
    pub fn unmake(&mut self) -> ChessEngineResult<Move> {
        let undo = self
            .history
            .pop()
            .ok_or(ChessEngineError::UnmakeWithoutMake)?;
        self.position = undo.position;
        self.key = undo.key;
        Ok(undo.mv)
    }

    /// Undo moves until the stack height is `height`
    pub(crate) fn unwind_to(&mut self, height: usize) {
        while self.history.len() > height {
            if let Some(undo) = self.history.pop() {
                self.position = undo.position;
                self.key = undo.key;
            }
        }
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    #[inline]
    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    #[inline]
    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    #[inline]
    pub fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    /// Fifty-move rule: one hundred half-moves without capture or pawn move
    #[inline]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.position.halfmoves() >= 100
    }

    /// How many times the current position has occurred, this one included
    pub fn repetition_count(&self) -> usize {
        let reversible = self.position.halfmoves() as usize;
        1 + self
            .history
            .iter()
            .rev()
            .take(reversible)
            .filter(|undo| undo.key == self.key)
            .count()
    }

    #[inline]
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 3
    }

    /// Any draw the rules allow to be claimed or that ends the game
    pub fn is_draw(&self) -> bool {
        self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_fifty_move_draw()
            || self.is_threefold_repetition()
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// Result of a finished game, `None` while play continues
    pub fn outcome(&self) -> Option<GameOutcome> {
        if self.is_checkmate() {
            Some(match self.turn() {
                Color::White => GameOutcome::BlackWins,
                Color::Black => GameOutcome::WhiteWins,
            })
        } else if self.is_draw() {
            Some(GameOutcome::Draw)
        } else {
            None
        }
    }

    /// Moves on the stack, oldest first, as UCI text
    pub fn move_history(&self) -> Vec<String> {
        self.history.iter().map(|undo| move_to_uci(&undo.mv)).collect()
    }

    /// Game record: starting FEN, the UCI move list and the result tag
    pub fn game_record(&self) -> String {
        let start = self
            .history
            .first()
            .map(|undo| Board::from_position(undo.position.clone()).to_fen())
            .unwrap_or_else(|| self.to_fen());
        let result = self.outcome().map_or("*", GameOutcome::as_str);
        format!(
            "[FEN \"{}\"]\n{} {}",
            start,
            self.move_history().join(" "),
            result
        )
    }

    /// Colour-mirrored board: ranks flipped, piece colours and side to move swapped
    pub fn mirror(&self) -> ChessEngineResult<Board> {
        Board::from_fen(&mirror_fen(&self.to_fen()))
    }
}

/// Zobrist key of a position
pub fn position_key(position: &Chess) -> u64 {
    let hash: Zobrist64 = position.zobrist_hash(EnPassantMode::Legal);
    hash.0
}

/// UCI text of a move (standard castling notation)
pub fn move_to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

fn swap_case(c: char) -> char {
    if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c.to_ascii_uppercase()
    }
}

/// Mirror a FEN string vertically with colours swapped
fn mirror_fen(fen: &str) -> String {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let placement = fields
        .first()
        .map(|p| {
            p.split('/')
                .rev()
                .map(|rank| rank.chars().map(swap_case).collect::<String>())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default();
    let turn = match fields.get(1) {
        Some(&"b") => "w",
        _ => "b",
    };
    let castling = match fields.get(2) {
        Some(&"-") | None => "-".to_string(),
        Some(rights) => {
            let mut swapped: Vec<char> = rights.chars().map(swap_case).collect();
            swapped.sort_by_key(|c| (c.is_ascii_lowercase(), *c != 'K' && *c != 'k'));
            swapped.into_iter().collect()
        }
    };
    let ep = match fields.get(3) {
        Some(&"-") | None => "-".to_string(),
        Some(square) => square
            .chars()
            .map(|c| match c {
                '3' => '6',
                '6' => '3',
                other => other,
            })
            .collect(),
    };
    let halfmoves = fields.get(4).copied().unwrap_or("0");
    let fullmoves = fields.get(5).copied().unwrap_or("1");
    format!("{placement} {turn} {castling} {ep} {halfmoves} {fullmoves}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::START_FEN;

    #[test]
    fn test_new_board_is_start_position() {
        let board = Board::new();
        assert_eq!(board.to_fen(), START_FEN);
        assert_eq!(board.legal_moves().len(), 20);
        assert_eq!(board.ply(), 0);
    }

    #[test]
    fn test_fen_round_trip_keeps_rights_and_ep() {
        let fen = "r3k2r/ppp2ppp/8/3pP3/8/8/PPP2PPP/R3K2R w Kq d6 0 10";
        let board = Board::from_fen(fen).unwrap();
        let again = Board::from_fen(&board.to_fen()).unwrap();
        assert_eq!(board.to_fen(), fen);
        assert_eq!(again.to_fen(), fen);
        assert_eq!(again.key(), board.key());
        assert_eq!(again.turn(), Color::White);
    }

    #[test]
    fn test_invalid_fen_is_rejected() {
        assert!(matches!(
            Board::from_fen("not a fen"),
            Err(ChessEngineError::InvalidFen { .. })
        ));
    }

    #[test]
    fn test_make_unmake_restores_position() {
        let mut board = Board::new();
        let key = board.key();
        let fen = board.to_fen();

        board.make_uci("e2e4").unwrap();
        board.make_uci("e7e5").unwrap();
        assert_ne!(board.key(), key);
        assert_eq!(board.height(), 2);

        board.unmake().unwrap();
        board.unmake().unwrap();
        assert_eq!(board.key(), key);
        assert_eq!(board.to_fen(), fen);
        assert!(matches!(
            board.unmake(),
            Err(ChessEngineError::UnmakeWithoutMake)
        ));
    }

    #[test]
    fn test_illegal_move_is_rejected() {
        let mut board = Board::new();
        assert!(matches!(
            board.make_uci("e2e5"),
            Err(ChessEngineError::InvalidMove { .. })
        ));
        assert!(matches!(
            board.make_uci("zz"),
            Err(ChessEngineError::InvalidMoveNotation { .. })
        ));
        assert_eq!(board.height(), 0);
    }

    #[test]
    fn test_key_ignores_move_counters() {
        let a = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let b = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 17 40").unwrap();
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_transposition_gives_same_key() {
        let mut a = Board::new();
        for mv in ["g1f3", "g8f6", "b1c3"] {
            a.make_uci(mv).unwrap();
        }
        let mut b = Board::new();
        for mv in ["b1c3", "g8f6", "g1f3"] {
            b.make_uci(mv).unwrap();
        }
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_repetition_detection() {
        let mut board = Board::new();
        for _ in 0..2 {
            for mv in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                board.make_uci(mv).unwrap();
            }
        }
        assert_eq!(board.repetition_count(), 3);
        assert!(board.is_draw());
        assert_eq!(board.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn test_checkmate_outcome() {
        let mut board = Board::new();
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            board.make_uci(mv).unwrap();
        }
        assert!(board.is_checkmate());
        assert_eq!(board.outcome(), Some(GameOutcome::BlackWins));
        assert!(board.game_record().ends_with("f2f3 e7e5 g2g4 d8h4 0-1"));
    }

    #[test]
    fn test_mirror_swaps_colours() {
        let board =
            Board::from_fen("r3k2r/ppp2ppp/8/3pP3/8/8/PPP2PPP/R3K2R w Kq d6 0 10").unwrap();
        let mirrored = board.mirror().unwrap();
        assert_eq!(
            mirrored.to_fen(),
            "r3k2r/ppp2ppp/8/8/3Pp3/8/PPP2PPP/R3K2R b Qk d3 0 10"
        );
        assert_eq!(mirrored.mirror().unwrap().to_fen(), board.to_fen());
    }

    #[test]
    fn test_insufficient_material_and_fifty_moves() {
        let bare = Board::from_fen("8/8/4k3/8/8/4K3/8/8 w - - 0 1").unwrap();
        assert!(bare.is_insufficient_material());
        let fifty = Board::from_fen("8/8/4k3/8/8/4K3/8/4R3 w - - 100 80").unwrap();
        assert!(fifty.is_fifty_move_draw());
        assert!(fifty.is_game_over());
    }
}
