//! Built-in opening table
//!
//! Positions are given as FEN and keyed by their position key when the book
//! is built. Weights are relative within a position.

pub(crate) type BookLine = (&'static str, &'static [(&'static str, u32)]);

#[rustfmt::skip]
pub(crate) const BUILTIN_LINES: &[BookLine] = &[
    // Starting position
    ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &[
        ("e2e4", 40), ("d2d4", 35), ("c2c4", 15), ("g1f3", 10),
    ]),
    // 1.e4
    ("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1", &[
        ("e7e5", 35), ("c7c5", 30), ("e7e6", 15), ("c7c6", 10), ("d7d6", 5), ("g8f6", 5),
    ]),
    // 1.d4
    ("rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq - 0 1", &[
        ("d7d5", 40), ("g8f6", 30), ("e7e6", 20), ("f7f5", 10),
    ]),
    // Ruy Lopez: 1.e4 e5 2.Nf3 Nc6 3.Bb5
    ("r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3", &[
        ("a7a6", 40), ("f8c5", 20), ("g8f6", 20), ("d7d6", 10), ("g7g6", 10),
    ]),
    // Sicilian: 1.e4 c5 2.Nf3
    ("rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2", &[
        ("d7d6", 35), ("b8c6", 30), ("e7e6", 25), ("g8f6", 10),
    ]),
    // French: 1.e4 e6 2.d4
    ("rnbqkbnr/pppp1ppp/4p3/8/3PP3/8/PPP2PPP/RNBQKBNR b KQkq - 0 2", &[
        ("d7d5", 70), ("c7c5", 20), ("b8c6", 10),
    ]),
    // Queen's Gambit: 1.d4 d5 2.c4
    ("rnbqkbnr/ppp1pppp/8/3p4/2PP4/8/PP2PPPP/RNBQKBNR b KQkq - 0 2", &[
        ("e7e6", 40), ("c7c6", 30), ("d5c4", 20), ("g8f6", 10),
    ]),
    // Italian: 1.e4 e5 2.Nf3 Nc6 3.Bc4
    ("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3", &[
        ("f8c5", 50), ("g8f6", 30), ("f8e7", 10), ("h7h6", 10),
    ]),
    // Indian defences: 1.d4 Nf6 2.c4
    ("rnbqkb1r/pppppppp/5n2/8/2PP4/8/PP2PPPP/RNBQKBNR b KQkq - 0 2", &[
        ("g7g6", 45), ("e7e6", 35), ("c7c5", 10), ("b7b6", 10),
    ]),
    // English: 1.c4
    ("rnbqkbnr/pppppppp/8/8/2P5/8/PP1PPPPP/RNBQKBNR b KQkq - 0 1", &[
        ("e7e5", 40), ("c7c5", 30), ("g8f6", 20), ("e7e6", 10),
    ]),
];

/// Opening names by move-sequence prefix, most specific first
pub(crate) const OPENING_NAMES: &[(&[&str], &str)] = &[
    (&["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"], "Ruy Lopez"),
    (&["e2e4", "e7e5", "g1f3", "b8c6", "f1c4"], "Italian Game"),
    (&["e2e4", "c7c5"], "Sicilian Defence"),
    (&["e2e4", "e7e6"], "French Defence"),
    (&["e2e4", "c7c6"], "Caro-Kann Defence"),
    (&["d2d4", "d7d5", "c2c4"], "Queen's Gambit"),
    (&["d2d4", "g8f6", "c2c4", "g7g6"], "King's Indian Defence"),
    (&["d2d4", "f7f5"], "Dutch Defence"),
    (&["c2c4"], "English Opening"),
];
