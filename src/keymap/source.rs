//! Where shortcuts come from: the source index and pending menu items

use std::collections::HashMap;
use std::fmt;
use std::panic::Location;

use serde::Serialize;

use super::types::ChordSequence;

/// File and line a shortcut was defined at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// The location of the calling code
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Maps each bound chord sequence to where it was defined
///
/// Entries are only ever added; a later definition of the same chords
/// replaces the earlier origin.
#[derive(Debug, Clone, Default)]
pub struct KeySourceIndex {
    entries: HashMap<ChordSequence, SourceLocation>,
}

impl KeySourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, chords: ChordSequence, origin: SourceLocation) {
        tracing::trace!("{} defined at {}", chords, origin);
        self.entries.insert(chords, origin);
    }

    pub fn get(&self, chords: &ChordSequence) -> Option<&SourceLocation> {
        self.entries.get(chords)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A menu-bar entry waiting to be materialized
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MenuItem {
    /// Top-level menu, e.g. `Enter`
    pub category: String,
    /// Item text, e.g. `Yank All`
    pub label: String,
}

impl MenuItem {
    pub fn new(category: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            label: label.into(),
        }
    }

    /// Command identifier for the item: `enter-yank-all`
    pub fn id(&self) -> String {
        format!(
            "{}-{}",
            self.category.to_lowercase(),
            self.label.to_lowercase().replace(' ', "-")
        )
    }
}
