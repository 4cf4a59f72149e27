//! Self-play episodes and the trace update
//!
//! Rewards are recorded from the point of view of the side that moved. The
//! value of a move is learned against the same side's next decision point,
//! two plies later, after subtracting whatever the opponent's reply earned.

use super::agent::QLearningAgent;
use crate::board::{move_to_uci, Board, GameOutcome};
use crate::constants::*;
use rand::Rng;
use shakmaty::Move;

/// One ply of a self-play game
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    /// Position key before the move
    pub key: u64,
    pub uci: String,
    /// Immediate reward for the side that moved
    pub reward: f64,
    /// Legal moves in the position, as UCI text
    pub legal: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeTrace {
    pub steps: Vec<TraceStep>,
    /// `None` when the episode hit the ply limit
    pub outcome: Option<GameOutcome>,
    pub record: String,
}

/// Capture bonus for the side making `mv`
pub fn capture_reward(mv: &Move, scale: f64) -> f64 {
    mv.capture()
        .map_or(0.0, |victim| scale * f64::from(role_value(victim)) / f64::from(PAWN_VALUE))
}

/// Play one game against itself with the agent's current policy
pub fn play_episode<R: Rng + ?Sized>(
    agent: &QLearningAgent,
    start: &Board,
    rng: &mut R,
) -> EpisodeTrace {
    let config = agent.config();
    let mut board = start.clone();
    let mut steps = Vec::new();

    while steps.len() < config.max_episode_plies as usize && !board.is_game_over() {
        let legal = board.legal_moves();
        let Some(mv) = agent.policy_move(&board, rng) else {
            break;
        };
        let key = board.key();
        let mut reward = capture_reward(&mv, config.capture_reward_scale);

        board.make_unchecked(&mv);
        if board.is_checkmate() {
            reward += WIN_REWARD;
        } else if board.is_draw() {
            reward += DRAW_REWARD;
        }

        steps.push(TraceStep {
            key,
            uci: move_to_uci(&mv),
            reward,
            legal: legal.iter().map(move_to_uci).collect(),
        });
    }

    EpisodeTrace {
        steps,
        outcome: board.outcome(),
        record: board.game_record(),
    }
}

/// Apply the Bellman update to every step, last ply first
pub fn apply_trace(agent: &mut QLearningAgent, trace: &EpisodeTrace) {
    let steps = &trace.steps;
    for (i, step) in steps.iter().enumerate().rev() {
        let reply = steps.get(i + 1).map_or(0.0, |s| s.reward);
        let next = steps.get(i + 2).map(|s| (s.key, s.legal.as_slice()));
        agent.update(step.key, &step.uci, step.reward - reply, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::QLearningConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn step(key: u64, uci: &str, reward: f64, legal: &[&str]) -> TraceStep {
        TraceStep {
            key,
            uci: uci.to_string(),
            reward,
            legal: legal.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_capture_reward_scale() {
        let board = Board::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let capture = board.parse_uci("e4d5").unwrap();
        let quiet = board.parse_uci("e4e5").unwrap();
        assert!((capture_reward(&capture, 0.1) - 0.9).abs() < 1e-12);
        assert_eq!(capture_reward(&quiet, 0.1), 0.0);
    }

    #[test]
    fn test_mate_reward_propagates_back_in_one_pass() {
        let config = QLearningConfig {
            alpha: 1.0,
            gamma: 0.5,
            ..QLearningConfig::default()
        };
        let mut agent = QLearningAgent::new(config);
        // White quiet move, Black quiet move, White mates
        let trace = EpisodeTrace {
            steps: vec![
                step(1, "a", 0.0, &["a", "x"]),
                step(2, "b", 0.0, &["b"]),
                step(3, "c", 1.0, &["c", "y"]),
            ],
            outcome: Some(GameOutcome::WhiteWins),
            record: String::new(),
        };
        apply_trace(&mut agent, &trace);

        let table = agent.table();
        assert_eq!(table.get(3, "c"), 1.0);
        // Black's move allowed the mate
        assert_eq!(table.get(2, "b"), -1.0);
        // White's first move sees the mate at its next decision point
        assert_eq!(table.get(1, "a"), 0.5);
    }

    #[test]
    fn test_episode_respects_ply_limit_and_restores_nothing() {
        let agent = QLearningAgent::new(QLearningConfig {
            max_episode_plies: 6,
            ..QLearningConfig::default()
        });
        let start = Board::new();
        let mut rng = StdRng::seed_from_u64(3);
        let trace = play_episode(&agent, &start, &mut rng);

        assert_eq!(trace.steps.len(), 6);
        assert_eq!(trace.outcome, None);
        assert_eq!(start.height(), 0);
        assert_eq!(trace.steps[0].key, start.key());
        assert_eq!(trace.steps[0].legal.len(), 20);
        assert!(trace.record.ends_with('*'));
    }

    #[test]
    fn test_seeded_episodes_are_reproducible() {
        let agent = QLearningAgent::new(QLearningConfig::default());
        let start = Board::new();
        let a = play_episode(&agent, &start, &mut StdRng::seed_from_u64(99));
        let b = play_episode(&agent, &start, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
