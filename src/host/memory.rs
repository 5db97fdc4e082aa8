//! In-memory host used by the `check` command and by tests
//!
//! Keymaps behave like an Emacs keymap tree: binding a sequence whose strict
//! prefix is already bound to a command fails with
//! [`BindError::NonPrefixKey`]. Key input is scripted up front; `None`
//! entries in the script stand for a pause longer than any read timeout.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use super::{BindError, Handler, Host, KeymapId, RawPrefix};
use crate::keymap::{ChordSequence, MenuItem, RawEvent};

/// A host call, recorded in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    Bind {
        keymap: KeymapId,
        chords: ChordSequence,
        ok: bool,
    },
    Unbind {
        keymap: KeymapId,
        chords: ChordSequence,
    },
    DefineCommand(String),
    SignalQuit,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    keymaps: HashMap<KeymapId, BTreeMap<ChordSequence, Handler>>,
    commands: BTreeMap<String, Handler>,
    script: VecDeque<Option<RawEvent>>,
    lines: VecDeque<String>,
    history: Vec<RawEvent>,
    prefix: Option<RawPrefix>,
    /// Every prompt passed to a read, in order
    pub prompts: Vec<String>,
    /// Timeouts passed to `read_key_event`, in order
    pub timeouts: Vec<Option<Duration>>,
    pub messages: Vec<String>,
    pub menu: Vec<MenuItem>,
    pub ops: Vec<HostOp>,
    pub beeps: usize,
    pub quit_inhibited: bool,
    pub cursor_hollow: bool,
    /// Whether the cursor was hollow at each read, in order
    pub hollow_at_reads: Vec<bool>,
    /// Bind failures to inject before consulting the keymaps
    pub injected_failures: VecDeque<BindError>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a key event
    pub fn push_event(&mut self, event: RawEvent) -> &mut Self {
        self.script.push_back(Some(event));
        self
    }

    /// Queue a pause: the next timed read returns `None`
    pub fn push_pause(&mut self) -> &mut Self {
        self.script.push_back(None);
        self
    }

    /// Queue typed characters as plain key codes
    pub fn type_text(&mut self, text: &str) -> &mut Self {
        for c in text.chars() {
            self.push_event(RawEvent::Code(c as i64));
        }
        self
    }

    /// Queue a line for `read_line`
    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push_back(line.into());
        self
    }

    /// Pretend these keys were typed earlier (for history lookups)
    pub fn set_history(&mut self, events: Vec<RawEvent>) {
        self.history = events;
    }

    /// Look up a complete binding
    pub fn binding(&self, keymap: &KeymapId, chords: &ChordSequence) -> Option<&Handler> {
        self.keymaps.get(keymap)?.get(chords)
    }

    /// Names of commands created through `define_command`
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Run the handler bound to `chords`, following command indirection
    ///
    /// Returns false when nothing runnable is bound.
    pub fn press(&self, keymap: &KeymapId, chords: &ChordSequence) -> bool {
        let mut handler = self.binding(keymap, chords);
        // Commands naming each other in a cycle run nothing
        for _ in 0..=self.commands.len() {
            match handler {
                Some(Handler::Callback(f)) => {
                    f();
                    return true;
                }
                Some(Handler::Command(name)) => handler = self.commands.get(name),
                None => return false,
            }
        }
        false
    }

    pub fn quit_count(&self) -> usize {
        self.ops.iter().filter(|op| **op == HostOp::SignalQuit).count()
    }

    /// Number of script entries not consumed yet
    pub fn remaining_events(&self) -> usize {
        self.script.len()
    }

    fn try_bind(
        &mut self,
        keymap: &KeymapId,
        chords: &ChordSequence,
        handler: Handler,
    ) -> Result<(), BindError> {
        if let Some(err) = self.injected_failures.pop_front() {
            return Err(err);
        }

        let map = self.keymaps.entry(keymap.clone()).or_default();
        if let Some(prefix) = chords.prefixes().find(|p| map.contains_key(p)) {
            return Err(BindError::NonPrefixKey {
                sequence: chords.clone(),
                prefix,
            });
        }

        // Rebinding a prefix replaces everything below it
        map.retain(|bound, _| !chords.is_prefix_of(bound));
        map.insert(chords.clone(), handler);
        Ok(())
    }
}

impl Host for MemoryHost {
    fn bind_key(
        &mut self,
        keymap: &KeymapId,
        chords: &ChordSequence,
        handler: Handler,
    ) -> Result<(), BindError> {
        let result = self.try_bind(keymap, chords, handler);
        self.ops.push(HostOp::Bind {
            keymap: keymap.clone(),
            chords: chords.clone(),
            ok: result.is_ok(),
        });
        result
    }

    fn unbind_key(&mut self, keymap: &KeymapId, chords: &ChordSequence) {
        if let Some(map) = self.keymaps.get_mut(keymap) {
            map.remove(chords);
        }
        self.ops.push(HostOp::Unbind {
            keymap: keymap.clone(),
            chords: chords.clone(),
        });
    }

    fn define_command(&mut self, name: &str, handler: Handler) -> Handler {
        self.commands.insert(name.to_string(), handler);
        self.ops.push(HostOp::DefineCommand(name.to_string()));
        Handler::Command(name.to_string())
    }

    fn read_key_event(&mut self, prompt: &str, timeout: Option<Duration>) -> Option<RawEvent> {
        self.prompts.push(prompt.to_string());
        self.timeouts.push(timeout);
        self.hollow_at_reads.push(self.cursor_hollow);

        loop {
            match self.script.pop_front()? {
                Some(event) => {
                    self.history.push(event.clone());
                    return Some(event);
                }
                // An untimed read waits through pauses
                None if timeout.is_none() => continue,
                None => return None,
            }
        }
    }

    fn read_line(&mut self, prompt: &str, initial: Option<&str>) -> String {
        self.prompts.push(prompt.to_string());
        self.hollow_at_reads.push(self.cursor_hollow);
        self.lines
            .pop_front()
            .or_else(|| initial.map(str::to_string))
            .unwrap_or_default()
    }

    fn pending_prefix(&self) -> Option<RawPrefix> {
        self.prefix.clone()
    }

    fn set_pending_prefix(&mut self, value: Option<RawPrefix>) {
        self.prefix = value;
    }

    fn set_quit_inhibited(&mut self, inhibited: bool) {
        self.quit_inhibited = inhibited;
    }

    fn signal_quit(&mut self) {
        self.ops.push(HostOp::SignalQuit);
    }

    fn last_key_events(&self, n: usize) -> Vec<RawEvent> {
        let start = self.history.len().saturating_sub(n);
        self.history[start..].to_vec()
    }

    fn message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn beep(&mut self) {
        self.beeps += 1;
    }

    fn set_cursor_hollow(&mut self, hollow: bool) {
        self.cursor_hollow = hollow;
    }

    fn add_menu_item(&mut self, item: &MenuItem) {
        self.menu.push(item.clone());
    }
}
