//! Runtime settings with persistence
//!
//! Settings are saved to `~/.config/emberforge/settings.toml`

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use emberforge_game::combat::DEFAULT_TURN_LIMIT;

/// All runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub generation: GenerationSettings,
    pub cache: CacheSettings,
    pub combat: CombatSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            cache: CacheSettings::default(),
            combat: CombatSettings::default(),
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("emberforge"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Generation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Base URL of the stat generation service
    pub service_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Whether to call the service at all; when false every craft uses
    /// the deterministic fallback
    pub enabled: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 10,
            enabled: true,
        }
    }
}

/// Crafting cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum cached items before least-recently-used eviction;
    /// unbounded when absent
    pub capacity: Option<usize>,
    /// JSON file the cache is loaded from on start and saved to on exit
    pub persist_path: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: None,
            persist_path: None,
        }
    }
}

/// Combat settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatSettings {
    /// Turns before an undecided duel is called a draw
    pub turn_limit: u32,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            turn_limit: DEFAULT_TURN_LIMIT,
        }
    }
}
