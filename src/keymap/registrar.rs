//! Registering shortcuts with the host
//!
//! ```text
//! name ──compile──► chords ──Host::bind_key──► bound
//!                                  │
//!                      NonPrefixKey (global, 2 chords)
//!                                  │
//!                  Host::unbind_key(prefix), bind once more
//!                                  │
//!                       still failing ──► logged, dropped
//! ```
//!
//! A failed binding never fails the registration call; only malformed names
//! do.

use std::path::Path;

use serde::Serialize;

use super::config::{KeymapError, ShortcutEntry, ShortcutTarget};
use super::mnemonic::compile;
use super::source::{KeySourceIndex, MenuItem, SourceLocation};
use super::types::{Chord, ChordSequence, KeyCode, Modifiers};
use crate::host::{BindError, Handler, Host, KeymapId};

/// A shortcut to register
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub name: String,
    pub handler: Handler,
    /// Explicit keymap; search-mode names ignore it
    pub keymap: Option<KeymapId>,
    pub origin: Option<SourceLocation>,
}

impl Shortcut {
    pub fn new(name: impl Into<String>, handler: Handler) -> Self {
        Self {
            name: name.into(),
            handler,
            keymap: None,
            origin: None,
        }
    }

    pub fn in_keymap(mut self, keymap: KeymapId) -> Self {
        self.keymap = Some(keymap);
        self
    }

    pub fn defined_at(mut self, origin: SourceLocation) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// What happened to a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Bound {
        keymap: String,
        chords: ChordSequence,
    },
    /// Bound after unbinding a conflicting prefix
    Rebound {
        keymap: String,
        chords: ChordSequence,
        unbound_prefix: ChordSequence,
    },
    /// The host refused; the shortcut is not bound
    Dropped {
        keymap: String,
        chords: ChordSequence,
        reason: String,
    },
}

impl Outcome {
    pub fn is_bound(&self) -> bool {
        !matches!(self, Outcome::Dropped { .. })
    }

    pub fn chords(&self) -> &ChordSequence {
        match self {
            Outcome::Bound { chords, .. }
            | Outcome::Rebound { chords, .. }
            | Outcome::Dropped { chords, .. } => chords,
        }
    }
}

/// A binding on its way into the host
struct PendingBinding {
    keymap: KeymapId,
    chords: ChordSequence,
    handler: Handler,
}

/// A shortcut file entry after registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedShortcut {
    #[serde(flatten)]
    pub outcome: Outcome,
    pub origin: Option<SourceLocation>,
}

/// Results of registering a whole shortcut file
#[derive(Debug, Default)]
pub struct LoadReport {
    pub outcomes: Vec<LoadedShortcut>,
    pub errors: Vec<KeymapError>,
}

/// Owns the key source index and the menu items waiting for the menu bar
#[derive(Debug, Default)]
pub struct Registrar {
    sources: KeySourceIndex,
    menu_queue: Vec<MenuItem>,
}

impl Registrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under a mnemonic name, remembering the caller's
    /// location for source lookups
    #[track_caller]
    pub fn register<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        name: &str,
        handler: Handler,
    ) -> Result<Outcome, KeymapError> {
        let shortcut = Shortcut::new(name, handler).defined_at(SourceLocation::caller());
        self.define(host, shortcut)
    }

    /// Register a fully described shortcut
    pub fn define<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        shortcut: Shortcut,
    ) -> Result<Outcome, KeymapError> {
        let compiled = compile(&shortcut.name)?;

        let keymap = if compiled.search {
            KeymapId::Isearch
        } else {
            shortcut.keymap.unwrap_or(KeymapId::Global)
        };

        let mut handler = shortcut.handler;
        if compiled.multi_word && keymap == KeymapId::Global {
            handler = host.define_command(&compiled.name, handler);
            if let Some(item) = compiled.menu_item {
                self.menu_queue.push(item);
            }
        }

        let pending = PendingBinding {
            keymap,
            chords: compiled.chords,
            handler,
        };
        let outcome = bind_with_retry(host, pending);
        self.record_origin(&outcome, shortcut.origin);
        Ok(outcome)
    }

    /// Bind literal chords (`C-x C-y`) in the global keymap
    #[track_caller]
    pub fn bind_chords<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        chords: &str,
        handler: Handler,
    ) -> Result<Outcome, KeymapError> {
        let chords: ChordSequence = chords.parse()?;
        let origin = SourceLocation::caller();
        let outcome = bind_with_retry(
            host,
            PendingBinding {
                keymap: KeymapId::Global,
                chords,
                handler,
            },
        );
        self.record_origin(&outcome, Some(origin));
        Ok(outcome)
    }

    /// Register every entry of a shortcut file
    ///
    /// Malformed entries are collected in the report; the rest still load.
    pub fn define_all<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        entries: Vec<ShortcutEntry>,
        file: &Path,
    ) -> LoadReport {
        let mut report = LoadReport::default();
        let file_name = file.display().to_string();

        for entry in entries {
            let handler = Handler::Command(entry.command);
            let origin = entry
                .line
                .map(|line| SourceLocation::new(file_name.clone(), line));

            let result = match entry.target {
                ShortcutTarget::Mnemonic(name) => {
                    let mut shortcut = Shortcut::new(name, handler);
                    shortcut.keymap = entry.keymap;
                    shortcut.origin = origin.clone();
                    self.define(host, shortcut)
                }
                ShortcutTarget::Chords(chords) => {
                    let outcome = bind_with_retry(
                        host,
                        PendingBinding {
                            keymap: entry.keymap.unwrap_or(KeymapId::Global),
                            chords,
                            handler,
                        },
                    );
                    self.record_origin(&outcome, origin.clone());
                    Ok(outcome)
                }
            };

            match result {
                Ok(outcome) => report.outcomes.push(LoadedShortcut { outcome, origin }),
                Err(e) => {
                    tracing::warn!("Skipping shortcut in {}: {}", file_name, e);
                    report.errors.push(e);
                }
            }
        }

        tracing::info!(
            "Registered {} shortcuts from {} ({} errors)",
            report.outcomes.len(),
            file_name,
            report.errors.len()
        );
        report
    }

    /// Only chords the host actually bound get an origin
    fn record_origin(&mut self, outcome: &Outcome, origin: Option<SourceLocation>) {
        if let (true, Some(origin)) = (outcome.is_bound(), origin) {
            self.sources.record(outcome.chords().clone(), origin);
        }
    }

    pub fn sources(&self) -> &KeySourceIndex {
        &self.sources
    }

    /// Where the shortcut for `chords` was defined
    ///
    /// Tells the user through the host when the chords are unknown.
    pub fn locate_source<H: Host + ?Sized>(
        &self,
        host: &mut H,
        chords: &ChordSequence,
    ) -> Option<&SourceLocation> {
        let found = self.sources.get(chords);
        if found.is_none() {
            host.beep();
            host.message(&format!("Key {} isn't mapped", chords));
        }
        found
    }

    /// Menu items not yet materialized, in registration order
    pub fn pending_menu_items(&self) -> &[MenuItem] {
        &self.menu_queue
    }

    /// Take all queued menu items, newest first, leaving the queue empty
    pub fn drain_menu_items(&mut self) -> Vec<MenuItem> {
        let mut items = std::mem::take(&mut self.menu_queue);
        items.reverse();
        items
    }

    /// Hand all queued menu items to the host's menu bar
    pub fn materialize_menu<H: Host + ?Sized>(&mut self, host: &mut H) -> usize {
        let items = self.drain_menu_items();
        for item in &items {
            host.add_menu_item(item);
        }
        items.len()
    }
}

fn bind_with_retry<H: Host + ?Sized>(host: &mut H, pending: PendingBinding) -> Outcome {
    let keymap_name = pending.keymap.to_string();

    let err = match define_key(host, &pending) {
        Ok(()) => {
            tracing::debug!("Bound {} in {}", pending.chords, keymap_name);
            return Outcome::Bound {
                keymap: keymap_name,
                chords: pending.chords,
            };
        }
        Err(err) => err,
    };

    let prefix = match err {
        BindError::NonPrefixKey { prefix, .. } if retry_applies(&pending) => prefix,
        err => {
            tracing::warn!("Could not bind {}: {}", pending.chords, err);
            return Outcome::Dropped {
                keymap: keymap_name,
                chords: pending.chords,
                reason: err.to_string(),
            };
        }
    };

    tracing::debug!(
        "Unbinding non-prefix key {} to make room for {}",
        prefix,
        pending.chords
    );
    host.unbind_key(&KeymapId::Global, &prefix);

    match define_key(host, &pending) {
        Ok(()) => Outcome::Rebound {
            keymap: keymap_name,
            chords: pending.chords,
            unbound_prefix: prefix,
        },
        Err(err) => {
            tracing::warn!(
                "Could not bind {} after unbinding {}: {}",
                pending.chords,
                prefix,
                err
            );
            Outcome::Dropped {
                keymap: keymap_name,
                chords: pending.chords,
                reason: err.to_string(),
            }
        }
    }
}

/// Only two-chord global shortcuts made of modified keys get a second try
fn retry_applies(pending: &PendingBinding) -> bool {
    pending.keymap == KeymapId::Global
        && pending.chords.len() == 2
        && pending.chords.chords().iter().all(Chord::is_modified)
}

/// Bind, plus a `C-<tab>` twin for sequences using `C-i`, which terminals
/// cannot tell apart from tab
fn define_key<H: Host + ?Sized>(host: &mut H, pending: &PendingBinding) -> Result<(), BindError> {
    host.bind_key(&pending.keymap, &pending.chords, pending.handler.clone())?;

    let control_i = Chord::ctrl('i');
    if pending.chords.contains(&control_i) {
        let twin = pending
            .chords
            .replace(control_i, Chord::new(KeyCode::Tab, Modifiers::CTRL));
        host.bind_key(&pending.keymap, &twin, pending.handler.clone())?;
    }
    Ok(())
}
