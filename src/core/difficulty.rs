//! Difficulty presets
//!
//! Difficulty is expressed as a time budget per move plus a depth cap.
//! Iterative deepening stops at whichever comes first.
//!
//! | Difficulty | Time/Move | Depth cap |
//! |------------|-----------|-----------|
//! | Easy       | 0.5s      | 3         |
//! | Medium     | 1.5s      | 5         |
//! | Hard       | 3.0s      | 7         |

use chess_engine::SearchConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Seconds of search per move
    pub fn seconds_per_move(self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 3.0,
        }
    }

    pub fn max_depth(self) -> u8 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 5,
            Difficulty::Hard => 7,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy (0.5s, depth 3)",
            Difficulty::Medium => "Medium (1.5s, depth 5)",
            Difficulty::Hard => "Hard (3.0s, depth 7)",
        }
    }

    /// Overwrite the depth and time limits of `config`
    pub fn apply(self, config: &mut SearchConfig) {
        config.max_depth = self.max_depth();
        config.time_budget_ms = Some((self.seconds_per_move() * 1000.0) as u64);
    }
}
