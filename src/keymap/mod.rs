//! Mnemonic keyboard shortcuts
//!
//! This module turns shortcut names into key chords and registers them with
//! a [`Host`](crate::host::Host):
//! - Compiles names like `enter_yank` into chords (`C-e C-y`)
//! - Decodes raw host key codes into characters and named keys
//! - Interprets prefix arguments (`C-u`, counts, free-form flags)
//! - Collects timed keyboard input with a pause window
//! - Binds shortcuts, retrying once around non-prefix key conflicts
//!
//! # Architecture
//!
//! ```text
//! name → compile() → ChordSequence → Registrar → Host::bind_key
//! Host::read_key_event → RawEvent → decode() → KeyEvent → InputEngine
//! ```
//!
//! # Registering Shortcuts
//!
//! ```ignore
//! let mut registrar = Registrar::new();
//! registrar.register(&mut host, "enter_yank", Handler::command("yank"))?;
//! registrar.materialize_menu(&mut host);
//! ```

mod config;
mod decode;
mod defaults;
mod history;
mod input;
mod mnemonic;
mod prefix;
mod registrar;
mod source;
mod types;

pub use config::{
    load_shortcuts_file, parse_shortcuts_yaml, KeymapError, ShortcutEntry, ShortcutTarget,
};
pub use decode::{
    decode, remove_control, sequence_to_letters, to_letter, to_letter_verbose, Key, KeyEvent,
    RawEvent, QUIT_CODE,
};
pub use defaults::{default_shortcuts, load_shortcut_layers, SHORTCUTS_FILE_NAME};
pub use history::{before_last, key_log, last_key};
pub use input::{filter_by_keys, InputEngine, InputError, InputMode, InputOptions};
pub use mnemonic::{compile, human_readable, translate_keys, words_to_letters, CompiledMnemonic};
pub use prefix::{
    add_prefix, clear_prefix, current_prefix, isearch_prefix, prefix_n, prefix_or_0,
    prefix_times, set_prefix, PrefixState,
};
pub use registrar::{LoadReport, LoadedShortcut, Outcome, Registrar, Shortcut};
pub use source::{KeySourceIndex, MenuItem, SourceLocation};
pub use types::{Chord, ChordSequence, KeyCode, Modifiers};
