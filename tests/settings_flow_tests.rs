//! Integration tests for the application layer
//!
//! Settings written to disk must produce an agent that honours them.

use hybrid_chess::chess_engine::{Board, HybridAgent, MoveSource, QLearningAgent};
use hybrid_chess::core::{load_settings, save_settings, Difficulty, EngineSettings};

#[test]
fn test_settings_file_configures_agent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut settings = EngineSettings {
        seed: 3,
        ..EngineSettings::default()
    };
    settings.engine.search.max_depth = 2;
    settings.engine.pipeline.use_book = false;
    settings.engine.pipeline.use_learned = false;
    save_settings(&settings, &path).unwrap();

    let loaded = load_settings(Some(&path));
    let config = loaded.effective_config();
    let learner = QLearningAgent::new(config.learning.clone());
    let mut agent = HybridAgent::from_config(&config, learner, loaded.seed).unwrap();

    let mut board = Board::new();
    let decision = agent.decide(&mut board).unwrap();
    assert_eq!(decision.source, MoveSource::Search);
    assert_eq!(agent.search_engine().config().max_depth, 2);
}

#[test]
fn test_difficulty_in_settings_sets_time_budget() {
    let settings = EngineSettings {
        difficulty: Some(Difficulty::Easy),
        ..EngineSettings::default()
    };
    let config = settings.effective_config();
    assert_eq!(config.search.time_budget_ms, Some(500));
    assert_eq!(config.search.max_depth, 3);
}
