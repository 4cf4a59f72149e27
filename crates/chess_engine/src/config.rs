//! Engine-wide configuration
//!
//! One serializable value holding the settings of every stage. Missing
//! fields take their defaults, so partial files load.

use crate::agent::PipelineConfig;
use crate::evaluation::EvalWeights;
use crate::learning::QLearningConfig;
use crate::opening::OpeningConfig;
use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub evaluation: EvalWeights,
    pub opening: OpeningConfig,
    pub learning: QLearningConfig,
    pub pipeline: PipelineConfig,
}
