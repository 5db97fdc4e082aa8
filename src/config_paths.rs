//! Centralized configuration paths for mnemokeys
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/mnemokeys/`
//! - Windows: `%APPDATA%\mnemokeys\`

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "mnemokeys";

/// Prefix of the daily rolling log files
pub const LOG_FILE_PREFIX: &str = "mnemokeys.log";

/// Base config directory for mnemokeys
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/mnemokeys`
///   - Else: `~/.config/mnemokeys`
///
/// Windows:
///   - `%APPDATA%\mnemokeys`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/mnemokeys/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// `~/.config/mnemokeys/shortcuts.yaml`
pub fn shortcuts_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(crate::keymap::SHORTCUTS_FILE_NAME))
}

/// `~/.config/mnemokeys/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> Result<PathBuf, String> {
    let dir = config_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = ensure_config_dir()?.join("logs");
    ensure_dir(&logs)?;
    Ok(logs)
}
