//! Settings persistence
//!
//! Saves and loads [`EngineSettings`] as JSON.
//!
//! # File Location
//!
//! Without an explicit path, settings live in `settings.json` inside the
//! user's configuration directory, falling back to the working directory
//! when no such directory exists.
//!
//! # Error Handling
//!
//! Loading never fails: a missing or invalid file is logged and replaced by
//! defaults. Saving reports its error to the caller.

use super::difficulty::Difficulty;
use super::error::CoreResult;
use chess_engine::EngineConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Everything the command line reads from the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub engine: EngineConfig,
    /// Applied on top of `engine.search` when playing
    pub difficulty: Option<Difficulty>,
    /// Q-table loaded for play when none is given on the command line
    pub qtable_path: Option<PathBuf>,
    pub seed: u64,
}

impl EngineSettings {
    /// Engine configuration with the difficulty preset applied
    pub fn effective_config(&self) -> EngineConfig {
        let mut config = self.engine.clone();
        if let Some(difficulty) = self.difficulty {
            difficulty.apply(&mut config.search);
        }
        config
    }
}

/// Default settings file location
///
/// E.g. `~/.config/hybrid-chess/settings.json` on Linux.
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "hybrid-chess", "hybrid-chess") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Load settings, using defaults when the file is missing or invalid
pub fn load_settings(path: Option<&Path>) -> EngineSettings {
    let settings_path = path.map_or_else(settings_path, Path::to_path_buf);

    if !settings_path.exists() {
        info!(
            "[SETTINGS] No settings file found at {:?}. Using defaults.",
            settings_path
        );
        return EngineSettings::default();
    }

    match fs::read_to_string(&settings_path) {
        Ok(contents) => match serde_json::from_str::<EngineSettings>(&contents) {
            Ok(settings) => {
                info!("[SETTINGS] Loaded settings from {:?}", settings_path);
                settings
            }
            Err(e) => {
                warn!(
                    "[SETTINGS] Failed to parse settings file at {:?}: {}. Using defaults.",
                    settings_path, e
                );
                EngineSettings::default()
            }
        },
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to read settings file at {:?}: {}. Using defaults.",
                settings_path, e
            );
            EngineSettings::default()
        }
    }
}

/// Write settings as pretty JSON, creating parent directories
pub fn save_settings(settings: &EngineSettings, path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}
