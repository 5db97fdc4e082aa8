//! mnemokeys - mnemonic keyboard shortcuts for editors
//!
//! Compiles shortcut names like `enter_yank` into key chords, binds them
//! through a [`Host`] editor, and reads timed keyboard input from it.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod host;
pub mod keymap;
pub mod tracing;

// Re-export commonly used types
pub use config::Settings;
pub use host::{BindError, Handler, Host, KeymapId, MemoryHost};
pub use keymap::{compile, ChordSequence, InputEngine, KeymapError, Registrar};
