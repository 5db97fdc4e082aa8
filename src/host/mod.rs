//! The host editor seam
//!
//! Everything stateful (keymap storage, key reading, the pending prefix
//! argument, quit handling, cursor feedback, menus) belongs to the host
//! editor. The keymap core only talks to it through [`Host`].

mod memory;

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use crate::keymap::{ChordSequence, MenuItem, RawEvent};

pub use memory::{HostOp, MemoryHost};

/// Identifies a keymap inside the host
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeymapId {
    /// The global keymap
    Global,
    /// The incremental-search keymap
    Isearch,
    /// Any other host keymap, by name
    Named(String),
}

impl fmt::Display for KeymapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeymapId::Global => f.write_str("global"),
            KeymapId::Isearch => f.write_str("isearch"),
            KeymapId::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for KeymapId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "global" | "global_map" => KeymapId::Global,
            "isearch" | "isearch_mode_map" => KeymapId::Isearch,
            other => KeymapId::Named(other.to_string()),
        })
    }
}

/// What a binding runs
#[derive(Clone)]
pub enum Handler {
    /// An in-process callback
    Callback(Rc<dyn Fn()>),
    /// A command the host evaluates by name
    Command(String),
}

impl Handler {
    pub fn callback(f: impl Fn() + 'static) -> Self {
        Handler::Callback(Rc::new(f))
    }

    pub fn command(name: impl Into<String>) -> Self {
        Handler::Command(name.into())
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Callback(_) => f.write_str("Callback(..)"),
            Handler::Command(name) => f.debug_tuple("Command").field(name).finish(),
        }
    }
}

/// Why the host refused a binding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// A strict prefix of the sequence is already bound to a command
    #[error("Key sequence {sequence} starts with non-prefix key {prefix}")]
    NonPrefixKey {
        sequence: ChordSequence,
        prefix: ChordSequence,
    },
    /// Any other refusal
    #[error("{0}")]
    Rejected(String),
}

impl BindError {
    /// Recover a structured error from a host that only reports text
    ///
    /// Recognizes `Key sequence <seq> starts with non-prefix key <prefix>`,
    /// optionally wrapped in double quotes.
    pub fn from_message(message: &str) -> BindError {
        let rejected = || BindError::Rejected(message.to_string());
        let text = message.trim().trim_matches('"');

        let Some(rest) = text.strip_prefix("Key sequence ") else {
            return rejected();
        };
        let Some((sequence, prefix)) = rest.split_once(" starts with non-prefix key ") else {
            return rejected();
        };

        match (sequence.parse(), prefix.trim_end_matches('"').parse()) {
            (Ok(sequence), Ok(prefix)) => BindError::NonPrefixKey { sequence, prefix },
            _ => rejected(),
        }
    }
}

/// Capabilities the keymap core requires from the host editor
///
/// All calls block. `read_key_event` is the only call that may suspend for
/// a bounded time.
pub trait Host {
    /// Bind `chords` to `handler` in `keymap`
    fn bind_key(
        &mut self,
        keymap: &KeymapId,
        chords: &ChordSequence,
        handler: Handler,
    ) -> Result<(), BindError>;

    /// Remove whatever `chords` is bound to in `keymap`
    fn unbind_key(&mut self, keymap: &KeymapId, chords: &ChordSequence);

    /// Define an interactive host command named `name` and return a handler
    /// that invokes it
    fn define_command(&mut self, name: &str, handler: Handler) -> Handler;

    /// Next raw key event; `None` when `timeout` elapsed first
    fn read_key_event(&mut self, prompt: &str, timeout: Option<Duration>) -> Option<RawEvent>;

    /// Line input with an optional pre-filled value
    fn read_line(&mut self, prompt: &str, initial: Option<&str>) -> String;

    /// The raw pending prefix argument
    fn pending_prefix(&self) -> Option<RawPrefix>;

    fn set_pending_prefix(&mut self, value: Option<RawPrefix>);

    /// Read and clear the pending prefix in one step
    fn take_pending_prefix(&mut self) -> Option<RawPrefix> {
        let value = self.pending_prefix();
        self.set_pending_prefix(None);
        value
    }

    /// Suppress or re-enable the host's own quit handling
    fn set_quit_inhibited(&mut self, inhibited: bool);

    /// Forward a cancellation to the host's interrupt handling
    fn signal_quit(&mut self);

    /// The last `n` raw key events, oldest first
    fn last_key_events(&self, n: usize) -> Vec<RawEvent>;

    /// Transient message in the echo area
    fn message(&mut self, _text: &str) {}

    fn beep(&mut self) {}

    /// Switch the cursor to (or back from) its "waiting for input" style
    fn set_cursor_hollow(&mut self, _hollow: bool) {}

    /// Materialize one menu-bar entry
    fn add_menu_item(&mut self, _item: &MenuItem) {}
}

/// The host's raw prefix argument representation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawPrefix {
    /// A numeric argument (`C-5`)
    Number(i64),
    /// The parenthesized list form produced by `C-u` (`(4)`, `(16)`, ...)
    List(i64),
    /// A symbol or free-form value (`u`, `-`, `update`)
    Text(String),
}

impl fmt::Display for RawPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawPrefix::Number(n) => write!(f, "{}", n),
            RawPrefix::List(n) => write!(f, "({})", n),
            RawPrefix::Text(s) => f.write_str(s),
        }
    }
}
