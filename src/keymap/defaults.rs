//! Shortcuts that ship with mnemokeys
//!
//! Can be extended from shortcuts.yaml in the current directory or the user
//! config dir.

use std::path::{Path, PathBuf};

use super::config::{load_shortcuts_file, parse_shortcuts_yaml, ShortcutEntry};

/// Default shortcuts YAML embedded at compile time
const DEFAULT_SHORTCUTS_YAML: &str = include_str!("../../shortcuts.yaml");

/// File name of project-local and user shortcut files
pub const SHORTCUTS_FILE_NAME: &str = "shortcuts.yaml";

/// The embedded shortcut entries
pub fn default_shortcuts() -> Vec<ShortcutEntry> {
    match parse_shortcuts_yaml(DEFAULT_SHORTCUTS_YAML) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to parse embedded shortcuts: {}", e);
            Vec::new()
        }
    }
}

/// Shortcut files to load, in order, each with its entries
///
/// Loading order:
/// 1. Embedded defaults (reported as `<builtin>`)
/// 2. shortcuts.yaml in the current directory
/// 3. User config at ~/.config/mnemokeys/shortcuts.yaml
///
/// Files that are missing are skipped; unreadable ones are logged and skipped.
pub fn load_shortcut_layers() -> Vec<(PathBuf, Vec<ShortcutEntry>)> {
    let mut layers = vec![(PathBuf::from("<builtin>"), default_shortcuts())];

    let local = Path::new(SHORTCUTS_FILE_NAME);
    let user = crate::config_paths::shortcuts_file();

    for path in std::iter::once(local.to_path_buf()).chain(user) {
        if !path.exists() {
            continue;
        }
        match load_shortcuts_file(&path) {
            Ok(entries) => {
                tracing::info!(
                    "Loaded {} shortcuts from {}",
                    entries.len(),
                    path.display()
                );
                layers.push((path, entries));
            }
            Err(e) => {
                tracing::warn!("Failed to load shortcuts from {}: {}", path.display(), e);
            }
        }
    }

    layers
}
