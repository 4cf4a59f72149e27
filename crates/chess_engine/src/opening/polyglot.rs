//! Polyglot opening book reader
//!
//! A Polyglot book is a sequence of 16-byte big-endian records sorted by
//! position key:
//!
//! | bytes | field  |
//! |-------|--------|
//! | 0..8  | key    |
//! | 8..10 | move   |
//! | 10..12| weight |
//! | 12..16| learn  |
//!
//! Move bits: 0-5 destination, 6-11 origin, 12-14 promotion piece
//! (1 knight .. 4 queen). Castling is written as the king capturing its own
//! rook, e.g. `e1h1` for White's short castle.

use crate::board::Board;
use crate::error::{ChessEngineError, ChessEngineResult};
use shakmaty::{Move, Role, Square};
use std::path::Path;

const RECORD_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyglotEntry {
    pub key: u64,
    pub raw_move: u16,
    pub weight: u16,
    pub learn: u32,
}

impl PolyglotEntry {
    fn from_bytes(bytes: &[u8; RECORD_SIZE]) -> Self {
        let mut key = [0u8; 8];
        key.copy_from_slice(&bytes[0..8]);
        let mut learn = [0u8; 4];
        learn.copy_from_slice(&bytes[12..16]);
        Self {
            key: u64::from_be_bytes(key),
            raw_move: u16::from_be_bytes([bytes[8], bytes[9]]),
            weight: u16::from_be_bytes([bytes[10], bytes[11]]),
            learn: u32::from_be_bytes(learn),
        }
    }

    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[0..8].copy_from_slice(&self.key.to_be_bytes());
        bytes[8..10].copy_from_slice(&self.raw_move.to_be_bytes());
        bytes[10..12].copy_from_slice(&self.weight.to_be_bytes());
        bytes[12..16].copy_from_slice(&self.learn.to_be_bytes());
        bytes
    }

    fn from_square(&self) -> u32 {
        u32::from((self.raw_move >> 6) & 0x3f)
    }

    fn to_square(&self) -> u32 {
        u32::from(self.raw_move & 0x3f)
    }

    fn promotion(&self) -> Option<Role> {
        match (self.raw_move >> 12) & 0x7 {
            1 => Some(Role::Knight),
            2 => Some(Role::Bishop),
            3 => Some(Role::Rook),
            4 => Some(Role::Queen),
            _ => None,
        }
    }

    /// Legal move of `board` this entry encodes, if any
    pub fn to_move(&self, board: &Board) -> Option<Move> {
        let from = Square::new(self.from_square());
        let to = Square::new(self.to_square());
        let promotion = self.promotion();
        board.legal_moves().into_iter().find(|mv| {
            let (mv_from, mv_to) = match mv {
                Move::Castle { king, rook } => (Some(*king), *rook),
                other => (other.from(), other.to()),
            };
            mv_from == Some(from) && mv_to == to && mv.promotion() == promotion
        })
    }
}

/// Encode origin, destination and promotion in Polyglot move bits
pub fn encode_move(from: Square, to: Square, promotion: Option<Role>) -> u16 {
    let promo = match promotion {
        Some(Role::Knight) => 1,
        Some(Role::Bishop) => 2,
        Some(Role::Rook) => 3,
        Some(Role::Queen) => 4,
        _ => 0,
    };
    (promo << 12) | ((u32::from(from) as u16) << 6) | u32::from(to) as u16
}

/// In-memory Polyglot book
#[derive(Debug, Clone, Default)]
pub struct PolyglotBook {
    entries: Vec<PolyglotEntry>,
}

impl PolyglotBook {
    /// Read a book file
    ///
    /// # Errors
    ///
    /// [`ChessEngineError::BookIo`] when the file cannot be read,
    /// [`ChessEngineError::BookFormat`] when its length is not a whole
    /// number of records.
    pub fn open(path: impl AsRef<Path>) -> ChessEngineResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ChessEngineError::BookIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes).map_err(|message| ChessEngineError::BookFormat {
            path: path.display().to_string(),
            message,
        })
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(format!(
                "length {} is not a multiple of {RECORD_SIZE}",
                bytes.len()
            ));
        }
        let mut entries: Vec<PolyglotEntry> = bytes
            .chunks_exact(RECORD_SIZE)
            .filter_map(|chunk| <&[u8; RECORD_SIZE]>::try_from(chunk).ok())
            .map(PolyglotEntry::from_bytes)
            .collect();
        // Books are sorted already; a stable sort keeps their move order
        entries.sort_by_key(|entry| entry.key);
        Ok(Self { entries })
    }

    pub fn from_entries(mut entries: Vec<PolyglotEntry>) -> Self {
        entries.sort_by_key(|entry| entry.key);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All records stored for `key`
    pub fn entries_for(&self, key: u64) -> &[PolyglotEntry] {
        let start = self.entries.partition_point(|entry| entry.key < key);
        let end = self.entries.partition_point(|entry| entry.key <= key);
        &self.entries[start..end]
    }

    /// Legal moves with their weights for the board's position
    pub fn candidates(&self, board: &Board) -> Vec<(Move, u32)> {
        self.entries_for(board.key())
            .iter()
            .filter_map(|entry| entry.to_move(board).map(|mv| (mv, u32::from(entry.weight))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::move_to_uci;
    use std::io::Write;

    fn write_book(entries: &[PolyglotEntry]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for entry in entries {
            file.write_all(&entry.to_bytes()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn entry(board: &Board, from: Square, to: Square, weight: u16) -> PolyglotEntry {
        PolyglotEntry {
            key: board.key(),
            raw_move: encode_move(from, to, None),
            weight,
            learn: 0,
        }
    }

    #[test]
    fn test_start_key_matches_polyglot() {
        assert_eq!(Board::new().key(), 0x463b_9618_1691_fc9c);
    }

    #[test]
    fn test_reads_weighted_moves_from_file() {
        let board = Board::new();
        let file = write_book(&[
            entry(&board, Square::E2, Square::E4, 10),
            entry(&board, Square::D2, Square::D4, 30),
            PolyglotEntry {
                key: board.key() ^ 1,
                raw_move: encode_move(Square::G1, Square::F3, None),
                weight: 99,
                learn: 0,
            },
        ]);

        let book = PolyglotBook::open(file.path()).unwrap();
        assert_eq!(book.len(), 3);
        let candidates: Vec<(String, u32)> = book
            .candidates(&board)
            .iter()
            .map(|(mv, w)| (move_to_uci(mv), *w))
            .collect();
        assert_eq!(
            candidates,
            vec![("e2e4".to_string(), 10), ("d2d4".to_string(), 30)]
        );
    }

    #[test]
    fn test_castling_is_king_takes_rook() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let book = PolyglotBook::from_entries(vec![entry(&board, Square::E1, Square::H1, 1)]);
        let candidates = book.candidates(&board);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].0.is_castle());
        assert_eq!(move_to_uci(&candidates[0].0), "e1g1");
    }

    #[test]
    fn test_illegal_entries_are_skipped() {
        let board = Board::new();
        let book = PolyglotBook::from_entries(vec![entry(&board, Square::E2, Square::E5, 1)]);
        assert!(book.candidates(&board).is_empty());
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 20]).unwrap();
        file.flush().unwrap();
        assert!(matches!(
            PolyglotBook::open(file.path()),
            Err(ChessEngineError::BookFormat { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PolyglotBook::open(dir.path().join("absent.bin")),
            Err(ChessEngineError::BookIo { .. })
        ));
    }
}
