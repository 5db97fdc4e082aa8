//! Settings persistence
//!
//! Stores user preferences in `~/.config/mnemokeys/config.yaml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings that persist across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// How long timed input waits for another key, in milliseconds
    #[serde(default = "default_pause_window_ms")]
    pub pause_window_ms: u64,
    /// Prompt used when an input call gives none
    #[serde(default = "default_prompt")]
    pub default_prompt: String,
    /// Console log filter when `RUST_LOG` is unset (e.g. "warn", "debug")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_pause_window_ms() -> u64 {
    350
}

fn default_prompt() -> String {
    "Input: ".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pause_window_ms: default_pause_window_ms(),
            default_prompt: default_prompt(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn pause_window(&self) -> Duration {
        Duration::from_millis(self.pause_window_ms)
    }

    /// Load settings from the config dir, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from `path`; missing or invalid files yield defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(settings) => {
                    tracing::info!("Loaded config from {}", path.display());
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to the config dir
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save settings to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
