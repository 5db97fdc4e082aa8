//! YAML configuration for shortcut definitions
//!
//! Parses shortcuts.yaml files into [`ShortcutEntry`] values.

use std::path::Path;

use serde::Deserialize;

use super::types::ChordSequence;
use crate::host::KeymapId;

/// Root structure of a shortcuts YAML file
#[derive(Debug, Deserialize)]
pub struct ShortcutsConfig {
    pub shortcuts: Vec<ShortcutConfig>,
}

/// A single entry from YAML
#[derive(Debug, Deserialize)]
pub struct ShortcutConfig {
    /// Mnemonic name, e.g. `enter_yank`
    #[serde(default)]
    pub name: Option<String>,
    /// Literal chords, e.g. `C-x C-y`
    #[serde(default)]
    pub keys: Option<String>,
    /// Host command to run
    pub command: String,
    #[serde(default)]
    pub keymap: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// What a shortcut entry binds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutTarget {
    Mnemonic(String),
    Chords(ChordSequence),
}

/// A validated shortcut entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutEntry {
    pub target: ShortcutTarget,
    pub command: String,
    pub keymap: Option<KeymapId>,
    /// 1-based line of the entry in its file, when known
    pub line: Option<u32>,
}

/// Load shortcut entries from a YAML file
pub fn load_shortcuts_file(path: &Path) -> Result<Vec<ShortcutEntry>, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::Io(e.to_string()))?;

    parse_shortcuts_yaml(&content)
}

/// Parse shortcut entries from a YAML string
pub fn parse_shortcuts_yaml(yaml: &str) -> Result<Vec<ShortcutEntry>, KeymapError> {
    let config: ShortcutsConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::Parse(e.to_string()))?;

    let current_platform = get_current_platform();
    let mut entries = Vec::new();
    let mut search_from = 0;

    for entry in config.shortcuts {
        if let Some(ref platform) = entry.platform {
            if platform != current_platform {
                continue;
            }
        }

        let (target, field, value) = match (entry.name, entry.keys) {
            (Some(name), None) => (ShortcutTarget::Mnemonic(name.clone()), "name", name),
            (None, Some(keys)) => (ShortcutTarget::Chords(keys.parse()?), "keys", keys),
            _ => {
                return Err(KeymapError::Parse(format!(
                    "Shortcut for {:?} needs exactly one of `name` or `keys`",
                    entry.command
                )))
            }
        };

        let line = line_of(yaml, field, &value, &mut search_from);
        entries.push(ShortcutEntry {
            target,
            command: entry.command,
            keymap: entry.keymap.map(|k| k.parse().unwrap_or(KeymapId::Global)),
            line,
        });
    }

    Ok(entries)
}

/// Find the 1-based line declaring `field: value`, scanning forward from the
/// previous match so repeated names resolve in order
fn line_of(yaml: &str, field: &str, value: &str, search_from: &mut usize) -> Option<u32> {
    let (offset, _) = yaml
        .lines()
        .enumerate()
        .skip(*search_from)
        .find(|(_, text)| declares(text, field, value))?;
    *search_from = offset + 1;
    u32::try_from(offset + 1).ok()
}

/// Whether a YAML line is `field: value` or `- field: value`, quoted or not
fn declares(line: &str, field: &str, value: &str) -> bool {
    let line = line.trim();
    let line = line.strip_prefix('-').map_or(line, str::trim_start);
    let Some(rest) = line.strip_prefix(field).and_then(|r| r.strip_prefix(':')) else {
        return false;
    };
    let rest = rest.trim();

    let scalar = match rest.chars().next() {
        Some(quote @ ('"' | '\'')) => rest[1..].split(quote).next().unwrap_or_default(),
        _ => rest.split(" #").next().unwrap_or_default().trim_end(),
    };
    scalar == value
}

fn get_current_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

/// Errors from compiling names and loading shortcut files
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeymapError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Malformed mnemonic {name:?}: {reason}")]
    MalformedMnemonic { name: String, reason: &'static str },
    #[error("Invalid chord: {0:?}")]
    InvalidChord(String),
}
