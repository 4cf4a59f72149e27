//! Transposition table
//!
//! Fixed-capacity cache from position key to search results. Each slot holds a
//! single entry; the slot index is the key modulo the capacity, so distinct
//! keys may compete for a slot.
//!
//! Replacement policy:
//! - empty slot, or entry left over from an earlier search → overwrite
//! - stored depth ≥ new depth → keep the stored entry
//! - otherwise → overwrite
//!
//! Entries from earlier searches are never trusted: scores involving
//! repetition draws depend on the path to the root, which changes between
//! searches.

use crate::constants::*;
use shakmaty::Move;

/// How a stored score relates to the true value of the position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Score is the exact value
    Exact,
    /// True value is at least the score (search failed high)
    Lower,
    /// True value is at most the score (search failed low)
    Upper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtEntry {
    pub key: u64,
    pub depth: u8,
    /// Mate scores are stored relative to this node, not the root
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
    pub generation: u8,
}

/// Outcome of consulting the table at a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Stored result settles the node
    Cutoff(i32),
    /// No cutoff; the window may have been narrowed and a move suggested
    Continue {
        alpha: i32,
        beta: i32,
        best_move: Option<Move>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtStats {
    pub probes: u64,
    pub hits: u64,
    pub cutoffs: u64,
    pub stores: u64,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: Vec<Option<TtEntry>>,
    generation: u8,
    stats: TtStats,
}

impl TranspositionTable {
    /// Table with exactly `capacity` slots (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity.max(1)],
            generation: 0,
            stats: TtStats::default(),
        }
    }

    pub fn with_size_mb(mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Option<TtEntry>>().max(1);
        Self::with_capacity(mb.saturating_mul(1024 * 1024) / entry_size)
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.stats = TtStats::default();
    }

    pub fn stats(&self) -> TtStats {
        self.stats
    }

    pub fn generation(&self) -> u8 {
        self.generation
    }

    /// Start a new search: entries stored so far become stale
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.stats = TtStats::default();
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.entries.len() as u64) as usize
    }

    /// Current-generation entry for `key`, if any
    pub fn get(&self, key: u64) -> Option<&TtEntry> {
        self.entries[self.index(key)]
            .as_ref()
            .filter(|entry| entry.key == key && entry.generation == self.generation)
    }

    /// Look up `key` for a node searched to `depth` with window `[alpha, beta]`
    ///
    /// Only entries at least `depth` deep can settle the node or narrow the
    /// window. An exact entry settles it; a lower bound may only raise alpha
    /// and an upper bound may only lower beta, and either settles the node
    /// only once the window closes. Shallower entries still suggest a move.
    pub fn probe(&mut self, key: u64, depth: u8, ply: usize, alpha: i32, beta: i32) -> Probe {
        self.stats.probes += 1;
        let Some(entry) = self.get(key).cloned() else {
            return Probe::Continue {
                alpha,
                beta,
                best_move: None,
            };
        };
        self.stats.hits += 1;

        if entry.depth < depth {
            return Probe::Continue {
                alpha,
                beta,
                best_move: entry.best_move,
            };
        }

        let score = score_from_tt(entry.score, ply);
        let (alpha, beta) = match entry.bound {
            Bound::Exact => {
                self.stats.cutoffs += 1;
                return Probe::Cutoff(score);
            }
            Bound::Lower => (alpha.max(score), beta),
            Bound::Upper => (alpha, beta.min(score)),
        };
        if alpha >= beta {
            self.stats.cutoffs += 1;
            return Probe::Cutoff(score);
        }
        Probe::Continue {
            alpha,
            beta,
            best_move: entry.best_move,
        }
    }

    /// Store a search result, subject to the replacement policy
    pub fn store(
        &mut self,
        key: u64,
        depth: u8,
        ply: usize,
        score: i32,
        bound: Bound,
        best_move: Option<Move>,
    ) {
        let index = self.index(key);
        let generation = self.generation;
        if let Some(existing) = &self.entries[index] {
            if existing.generation == generation && existing.depth >= depth {
                return;
            }
        }
        self.stats.stores += 1;
        self.entries[index] = Some(TtEntry {
            key,
            depth,
            score: score_to_tt(score, ply),
            bound,
            best_move,
            generation,
        });
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::with_size_mb(DEFAULT_TT_SIZE_MB)
    }
}

/// Bound kind of a fail-soft result searched with window `[alpha, beta]`
pub fn bound_for(score: i32, alpha: i32, beta: i32) -> Bound {
    if score <= alpha {
        Bound::Upper
    } else if score >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    }
}

/// Root-relative mate score to node-relative
#[inline]
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply as i32
    } else if score < -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

/// Node-relative mate score to root-relative
#[inline]
fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply as i32
    } else if score < -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}
