//! Q-value store
//!
//! Maps a position key and a move (UCI text) to a learned value. Entries
//! that were never written read as 0.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    entries: HashMap<u64, HashMap<String, f64>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: u64, uci: &str) -> f64 {
        self.entries
            .get(&key)
            .and_then(|actions| actions.get(uci))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn set(&mut self, key: u64, uci: &str, value: f64) {
        self.entries
            .entry(key)
            .or_default()
            .insert(uci.to_string(), value);
    }

    /// Stored values for a position, if any move was ever written
    pub fn actions(&self, key: u64) -> Option<&HashMap<String, f64>> {
        self.entries.get(&key)
    }

    /// Largest value among `moves` at `key` (0 for an empty list)
    pub fn max_value<S: AsRef<str>>(&self, key: u64, moves: &[S]) -> f64 {
        moves
            .iter()
            .map(|uci| self.get(key, uci.as_ref()))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Number of positions with at least one stored value
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of stored (position, move) values
    pub fn value_count(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_read_as_zero() {
        let table = QTable::new();
        assert_eq!(table.get(1, "e2e4"), 0.0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_max_value_defaults_missing_moves() {
        let mut table = QTable::new();
        table.set(9, "a1a2", -0.4);
        table.set(9, "a1a3", -0.1);
        assert_eq!(table.max_value(9, &["a1a2", "a1a3"]), -0.1);
        // An unseen legal move counts as 0
        assert_eq!(table.max_value(9, &["a1a2", "a1a3", "a1a4"]), 0.0);
        assert_eq!(table.max_value::<&str>(9, &[]), 0.0);
    }

    #[test]
    fn test_counts() {
        let mut table = QTable::new();
        table.set(1, "e2e4", 0.5);
        table.set(1, "d2d4", 0.2);
        table.set(2, "e7e5", 0.1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value_count(), 3);
    }
}
