//! Epsilon-greedy Q-learning agent
//!
//! Owns the Q-table, the current exploration rate and the training
//! statistics. Randomness is always supplied by the caller.

use super::qtable::QTable;
use super::selfplay::{apply_trace, play_episode, EpisodeTrace};
use crate::board::{move_to_uci, Board, GameOutcome};
use crate::constants::*;
use crate::error::{ChessEngineError, ChessEngineResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shakmaty::Move;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const SNAPSHOT_MAGIC: [u8; 4] = *b"HCQT";
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Learning rate
    pub alpha: f64,
    /// Discount factor
    pub gamma: f64,
    /// Initial exploration rate
    pub epsilon: f64,
    /// Multiplier applied to epsilon after every episode
    pub epsilon_decay: f64,
    pub epsilon_min: f64,
    /// Episodes stop undecided after this many plies
    pub max_episode_plies: u32,
    /// Reward per pawn unit of material captured
    pub capture_reward_scale: f64,
    /// Position every self-play episode starts from
    pub start_fen: String,
    /// Episodes between two progress log lines
    pub log_interval: u32,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            gamma: DEFAULT_GAMMA,
            epsilon: DEFAULT_EPSILON,
            epsilon_decay: DEFAULT_EPSILON_DECAY,
            epsilon_min: DEFAULT_EPSILON_MIN,
            max_episode_plies: DEFAULT_MAX_EPISODE_PLIES,
            capture_reward_scale: DEFAULT_CAPTURE_REWARD_SCALE,
            start_fen: START_FEN.to_string(),
            log_interval: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub episodes: u64,
    pub white_wins: u64,
    pub black_wins: u64,
    pub draws: u64,
    /// Episodes cut off by the ply limit
    pub unfinished: u64,
}

impl TrainingStats {
    pub fn record(&mut self, outcome: Option<GameOutcome>) {
        self.episodes += 1;
        match outcome {
            Some(GameOutcome::WhiteWins) => self.white_wins += 1,
            Some(GameOutcome::BlackWins) => self.black_wins += 1,
            Some(GameOutcome::Draw) => self.draws += 1,
            None => self.unfinished += 1,
        }
    }
}

/// Persisted form of an agent
#[derive(Serialize, Deserialize)]
struct Snapshot {
    magic: [u8; 4],
    version: u32,
    epsilon: f64,
    stats: TrainingStats,
    table: QTable,
}

#[derive(Debug, Clone)]
pub struct QLearningAgent {
    config: QLearningConfig,
    table: QTable,
    epsilon: f64,
    stats: TrainingStats,
}

impl QLearningAgent {
    /// Agent with an empty table
    pub fn new(config: QLearningConfig) -> Self {
        Self::with_table(config, QTable::new())
    }

    pub fn with_table(config: QLearningConfig, table: QTable) -> Self {
        let epsilon = config.epsilon;
        Self {
            config,
            table,
            epsilon,
            stats: TrainingStats::default(),
        }
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    pub fn stats(&self) -> TrainingStats {
        self.stats
    }

    /// Stored value of `mv` in the board's position
    pub fn q_value(&self, board: &Board, mv: &Move) -> f64 {
        self.table.get(board.key(), &move_to_uci(mv))
    }

    /// Legal move with the highest value; ties go to the earliest generated
    pub fn greedy_move(&self, board: &Board) -> Option<(Move, f64)> {
        let key = board.key();
        let mut best: Option<(Move, f64)> = None;
        for mv in board.legal_moves() {
            let value = self.table.get(key, &move_to_uci(&mv));
            if best.as_ref().is_none_or(|(_, best_value)| value > *best_value) {
                best = Some((mv, value));
            }
        }
        best
    }

    /// Epsilon-greedy choice with an explicit exploration rate
    pub fn choose_move<R: Rng + ?Sized>(
        &self,
        board: &Board,
        epsilon: f64,
        rng: &mut R,
    ) -> Option<Move> {
        let legal = board.legal_moves();
        if legal.is_empty() {
            return None;
        }
        if rng.random::<f64>() < epsilon {
            return Some(legal[rng.random_range(0..legal.len())].clone());
        }
        self.greedy_move(board).map(|(mv, _)| mv)
    }

    /// Epsilon-greedy choice at the agent's current exploration rate
    pub fn policy_move<R: Rng + ?Sized>(&self, board: &Board, rng: &mut R) -> Option<Move> {
        self.choose_move(board, self.epsilon, rng)
    }

    /// Bellman update of one (position, move) value
    ///
    /// `next` is the agent's next decision point with its legal moves; `None`
    /// when there is none, in which case the target is the reward alone.
    pub fn update(&mut self, key: u64, uci: &str, reward: f64, next: Option<(u64, &[String])>) {
        let old = self.table.get(key, uci);
        let target = match next {
            Some((next_key, moves)) if !moves.is_empty() => {
                reward + self.config.gamma * self.table.max_value(next_key, moves)
            }
            _ => reward,
        };
        let new = old + self.config.alpha * (target - old);
        // Unchanged values are not written, so absent entries stay absent
        if new != old {
            self.table.set(key, uci, new);
        }
    }

    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }

    /// Play one self-play episode from `start`, learn from it and decay epsilon
    pub fn run_episode<R: Rng + ?Sized>(&mut self, start: &Board, rng: &mut R) -> EpisodeTrace {
        let trace = play_episode(self, start, rng);
        apply_trace(self, &trace);
        self.stats.record(trace.outcome);
        self.decay_epsilon();
        trace
    }

    /// Self-play training from the configured start position
    ///
    /// # Errors
    ///
    /// Fails only when the configured start FEN is invalid.
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        episodes: u32,
        rng: &mut R,
    ) -> ChessEngineResult<TrainingStats> {
        let start = Board::from_fen(&self.config.start_fen)?;
        info!("[QLEARN] Training for {} episodes", episodes);

        let interval = self.config.log_interval.max(1);
        for episode in 1..=episodes {
            let trace = self.run_episode(&start, rng);
            if episode % interval == 0 {
                let s = self.stats;
                info!(
                    "[QLEARN] Episode {} | eps={:.3} | W:{} B:{} D:{} U:{} | states:{}",
                    episode,
                    self.epsilon,
                    s.white_wins,
                    s.black_wins,
                    s.draws,
                    s.unfinished,
                    self.table.len()
                );
            } else {
                debug!(
                    "[QLEARN] Episode {} finished after {} plies",
                    episode,
                    trace.steps.len()
                );
            }
        }
        Ok(self.stats)
    }

    /// Write table, exploration rate and statistics to `path`
    ///
    /// # Errors
    ///
    /// [`ChessEngineError::QTableIo`] when the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> ChessEngineResult<()> {
        let path = path.as_ref();
        let io_error = |source: std::io::Error| ChessEngineError::QTableIo {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let snapshot = Snapshot {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            epsilon: self.epsilon,
            stats: self.stats,
            table: self.table.clone(),
        };
        let bytes = bincode::serialize(&snapshot).map_err(|e| ChessEngineError::QTableCorrupt {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(path, bytes).map_err(io_error)?;
        info!(
            "[QLEARN] Q-table saved to {} ({} states)",
            path.display(),
            self.table.len()
        );
        Ok(())
    }

    /// Restore an agent saved with [`QLearningAgent::save`]
    ///
    /// # Errors
    ///
    /// [`ChessEngineError::QTableIo`] when the file is missing or unreadable,
    /// [`ChessEngineError::QTableCorrupt`] when it is not a Q-table blob.
    pub fn load(path: impl AsRef<Path>, config: QLearningConfig) -> ChessEngineResult<Self> {
        let path = path.as_ref();
        let corrupt = |message: String| ChessEngineError::QTableCorrupt {
            path: path.display().to_string(),
            message,
        };
        let bytes = fs::read(path).map_err(|source| ChessEngineError::QTableIo {
            path: path.display().to_string(),
            source,
        })?;
        let snapshot: Snapshot =
            bincode::deserialize(&bytes).map_err(|e| corrupt(e.to_string()))?;
        if snapshot.magic != SNAPSHOT_MAGIC {
            return Err(corrupt("not a Q-table file".to_string()));
        }
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {}",
                snapshot.version
            )));
        }

        info!(
            "[QLEARN] Q-table loaded from {} ({} states)",
            path.display(),
            snapshot.table.len()
        );
        Ok(Self {
            config,
            table: snapshot.table,
            epsilon: snapshot.epsilon,
            stats: snapshot.stats,
        })
    }

    /// Like [`QLearningAgent::load`], but a missing file yields a fresh agent
    ///
    /// A file that exists but cannot be read or decoded is still an error.
    pub fn load_or_empty(path: impl AsRef<Path>, config: QLearningConfig) -> ChessEngineResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path, config)
        } else {
            info!(
                "[QLEARN] No Q-table at {}, starting empty",
                path.display()
            );
            Ok(Self::new(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// White rook on a4 can step to a5, where the b6 pawn takes it
    const HANGING_ROOK_FEN: &str = "7k/8/1p6/8/R7/8/8/7K w - - 0 1";

    fn toy_config() -> QLearningConfig {
        QLearningConfig {
            epsilon: 1.0,
            epsilon_decay: 1.0,
            max_episode_plies: 2,
            start_fen: HANGING_ROOK_FEN.to_string(),
            ..QLearningConfig::default()
        }
    }

    #[test]
    fn test_zero_alpha_zero_reward_is_idempotent() {
        let config = QLearningConfig {
            alpha: 0.0,
            ..QLearningConfig::default()
        };
        let mut agent = QLearningAgent::new(config);
        let next = vec!["e7e5".to_string()];
        agent.update(1, "e2e4", 0.0, Some((2, next.as_slice())));
        assert!(agent.table().is_empty());

        agent.table.set(1, "e2e4", 0.25);
        let before = agent.table().clone();
        agent.update(1, "e2e4", 0.0, Some((2, next.as_slice())));
        agent.update(1, "d2d4", 0.0, None);
        assert_eq!(agent.table(), &before);
    }

    #[test]
    fn test_update_follows_bellman_target() {
        let mut agent = QLearningAgent::new(QLearningConfig::default());
        agent.table.set(2, "e7e5", 0.5);
        let next = vec!["e7e5".to_string(), "c7c5".to_string()];
        agent.update(1, "e2e4", 0.1, Some((2, next.as_slice())));
        let expected = 0.3 * (0.1 + 0.95 * 0.5);
        assert!((agent.table().get(1, "e2e4") - expected).abs() < 1e-12);

        // Terminal transition: reward only
        agent.update(3, "d1h5", 1.0, None);
        assert!((agent.table().get(3, "d1h5") - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_breaks_ties_by_generation_order() {
        let agent = QLearningAgent::new(QLearningConfig::default());
        let board = Board::new();
        let (mv, value) = agent.greedy_move(&board).unwrap();
        assert_eq!(mv, board.legal_moves()[0]);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_greedy_prefers_highest_value() {
        let mut agent = QLearningAgent::new(QLearningConfig::default());
        let board = Board::new();
        agent.table.set(board.key(), "g1f3", 0.4);
        agent.table.set(board.key(), "e2e4", 0.2);
        let mut rng = StdRng::seed_from_u64(5);
        let mv = agent.choose_move(&board, 0.0, &mut rng).unwrap();
        assert_eq!(move_to_uci(&mv), "g1f3");
    }

    #[test]
    fn test_epsilon_decays_to_floor() {
        let mut agent = QLearningAgent::new(QLearningConfig {
            epsilon: 0.1,
            epsilon_decay: 0.5,
            epsilon_min: 0.05,
            ..QLearningConfig::default()
        });
        agent.decay_epsilon();
        assert!((agent.epsilon() - 0.05).abs() < 1e-12);
        agent.decay_epsilon();
        assert!((agent.epsilon() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_training_avoids_hanging_the_rook() {
        let mut agent = QLearningAgent::new(toy_config());
        let mut rng = StdRng::seed_from_u64(7);
        let stats = agent.train(600, &mut rng).unwrap();
        assert_eq!(stats.episodes, 600);
        assert_eq!(stats.unfinished, 600);

        let board = Board::from_fen(HANGING_ROOK_FEN).unwrap();
        let hanging = board.parse_uci("a4a5").unwrap();
        assert!(agent.q_value(&board, &hanging) < 0.0);

        let (greedy, _) = agent.greedy_move(&board).unwrap();
        assert_ne!(move_to_uci(&greedy), "a4a5");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("q.bin");

        let mut agent = QLearningAgent::new(toy_config());
        let mut rng = StdRng::seed_from_u64(11);
        agent.train(50, &mut rng).unwrap();
        agent.save(&path).unwrap();

        let loaded = QLearningAgent::load(&path, toy_config()).unwrap();
        assert_eq!(loaded.table(), agent.table());
        assert_eq!(loaded.stats(), agent.stats());
        assert_eq!(loaded.epsilon(), agent.epsilon());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bin");
        assert!(matches!(
            QLearningAgent::load(&path, QLearningConfig::default()),
            Err(ChessEngineError::QTableIo { .. })
        ));
        let fresh = QLearningAgent::load_or_empty(&path, QLearningConfig::default()).unwrap();
        assert!(fresh.table().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.bin");
        fs::write(&path, b"definitely not a q-table").unwrap();
        assert!(matches!(
            QLearningAgent::load(&path, QLearningConfig::default()),
            Err(ChessEngineError::QTableCorrupt { .. })
        ));
        assert!(matches!(
            QLearningAgent::load_or_empty(&path, QLearningConfig::default()),
            Err(ChessEngineError::QTableCorrupt { .. })
        ));
    }
}
