//! Reading user input: single characters, lines, and pause-terminated keys
//!
//! Timed input accumulates keys until the user pauses for the pause window.
//! Keys typed with control held are read as their plain letters, so a
//! shortcut can be followed by more letters without letting go of control.
//!
//! ```text
//! Idle ──► WaitingFirstKey ──► AccumulatingWithTimeout ──► Done
//!              │                       │
//!              └──────── C-g ──────────┴──► InterruptedExit
//! ```

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use super::decode::{decode, remove_control, to_letter, RawEvent};
use crate::config::Settings;
use crate::host::Host;

/// How input is terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// A whole line, terminated by the host's line editor
    #[default]
    Line,
    /// Exactly this many characters
    Chars(usize),
    /// Keys until a pause; waits for the first key
    Timed,
    /// Keys until a pause; a pause before any key yields nothing
    Optional,
}

/// Options for [`InputEngine::collect`]
#[derive(Debug, Clone, Default)]
pub struct InputOptions {
    pub prompt: Option<String>,
    pub mode: InputMode,
    /// Pre-filled text for line input
    pub initial_input: Option<String>,
}

impl InputOptions {
    pub fn line() -> Self {
        Self::default()
    }

    pub fn chars(n: usize) -> Self {
        Self {
            mode: InputMode::Chars(n),
            ..Self::default()
        }
    }

    pub fn timed() -> Self {
        Self {
            mode: InputMode::Timed,
            ..Self::default()
        }
    }

    pub fn optional() -> Self {
        Self {
            mode: InputMode::Optional,
            ..Self::default()
        }
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn initial_input(mut self, text: impl Into<String>) -> Self {
        self.initial_input = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The user pressed the quit key; the host has already been told
    #[error("Quit")]
    Cancelled,
    #[error("No choice starts with {0:?}")]
    NoMatchingChoice(String),
}

/// Holds the host's quit handling off until dropped
struct QuitInhibited<'a, H: Host + ?Sized> {
    host: &'a mut H,
}

impl<'a, H: Host + ?Sized> QuitInhibited<'a, H> {
    fn new(host: &'a mut H) -> Self {
        host.set_quit_inhibited(true);
        Self { host }
    }
}

impl<H: Host + ?Sized> Deref for QuitInhibited<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: Host + ?Sized> DerefMut for QuitInhibited<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: Host + ?Sized> Drop for QuitInhibited<'_, H> {
    fn drop(&mut self) {
        self.host.set_quit_inhibited(false);
    }
}

/// Reads keys from the host
#[derive(Debug, Clone)]
pub struct InputEngine {
    pause_window: Duration,
    default_prompt: String,
}

impl Default for InputEngine {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl InputEngine {
    pub fn new(pause_window: Duration, default_prompt: impl Into<String>) -> Self {
        Self {
            pause_window,
            default_prompt: default_prompt.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.pause_window(), settings.default_prompt.clone())
    }

    pub fn pause_window(&self) -> Duration {
        self.pause_window
    }

    /// Collect input according to `options`
    ///
    /// Returns `Ok(None)` when timed input ended without any key. The quit
    /// key cancels: the host is signalled and `InputError::Cancelled` is
    /// returned without any partial result.
    pub fn collect<H: Host + ?Sized>(
        &self,
        host: &mut H,
        options: &InputOptions,
    ) -> Result<Option<String>, InputError> {
        let prompt = options.prompt.as_deref().unwrap_or(&self.default_prompt);

        host.set_cursor_hollow(true);
        let result = match options.mode {
            InputMode::Line => {
                // The host's line editor shows its own cursor
                host.set_cursor_hollow(false);
                Ok(Some(host.read_line(prompt, options.initial_input.as_deref())))
            }
            InputMode::Chars(n) => self.read_chars(host, prompt, n),
            InputMode::Timed => self.read_timed(host, prompt, false),
            InputMode::Optional => self.read_timed(host, prompt, true),
        };
        host.set_cursor_hollow(false);

        if result == Err(InputError::Cancelled) {
            tracing::debug!("Input cancelled");
            host.signal_quit();
        }
        result
    }

    fn read_chars<H: Host + ?Sized>(
        &self,
        host: &mut H,
        prompt: &str,
        n: usize,
    ) -> Result<Option<String>, InputError> {
        let mut chars = String::with_capacity(n);
        while chars.chars().count() < n {
            let Some(event) = host.read_key_event(prompt, None) else {
                break;
            };
            if event.is_quit() {
                return Err(InputError::Cancelled);
            }
            if let Some(c) = decode(&event).code.and_then(remove_control) {
                chars.push(c);
            }
        }
        Ok((!chars.is_empty()).then_some(chars))
    }

    fn read_timed<H: Host + ?Sized>(
        &self,
        host: &mut H,
        prompt: &str,
        optional: bool,
    ) -> Result<Option<String>, InputError> {
        let mut host = QuitInhibited::new(host);
        let mut keys = String::new();

        if !optional {
            if let Some(event) = host.read_key_event(prompt, None) {
                accumulate(&mut keys, &event)?;
            }
        }

        while let Some(event) =
            host.read_key_event(&format!("{}{}", prompt, keys), Some(self.pause_window))
        {
            accumulate(&mut keys, &event)?;
        }

        host.message("");
        Ok((!keys.is_empty()).then_some(keys))
    }

    /// Prompt with `[e]dit, [d]elete` style choices and read one character
    ///
    /// Returns the value of the first choice whose label starts with the
    /// typed character.
    pub fn input_with_choices<H: Host + ?Sized, T: Clone>(
        &self,
        host: &mut H,
        prompt: Option<&str>,
        choices: &[(&str, T)],
    ) -> Result<T, InputError> {
        let listing = choices
            .iter()
            .map(|(label, _)| {
                let mut chars = label.chars();
                match chars.next() {
                    Some(first) => format!("[{}]{}", first, chars.as_str()),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = match prompt {
            Some(p) => format!("{} {}", p, listing),
            None => listing,
        };

        let typed = self
            .collect(host, &InputOptions::chars(1).prompt(prompt))?
            .unwrap_or_default();

        choices
            .iter()
            .find(|(label, _)| !typed.is_empty() && label.starts_with(&typed))
            .map(|(_, value)| value.clone())
            .ok_or(InputError::NoMatchingChoice(typed))
    }

    /// A single character if one is typed within the pause window
    pub fn read_char_maybe<H: Host + ?Sized>(&self, host: &mut H) -> Option<char> {
        let event = host.read_key_event("Optionally type a char:", Some(self.pause_window));
        host.message("");
        decode(&event?).code.and_then(remove_control)
    }
}

fn accumulate(keys: &mut String, event: &RawEvent) -> Result<(), InputError> {
    if event.is_quit() {
        return Err(InputError::Cancelled);
    }
    if let Some(c) = decode(event).code.and_then(to_letter) {
        keys.push(c);
    }
    Ok(())
}

/// Pick the first item matching typed keys
///
/// An item starting with `keys` wins; otherwise the first item starting with
/// the first key and containing the rest in order (`rb` finds `ruby`).
pub fn filter_by_keys<'a>(list: &[&'a str], keys: &str) -> Option<&'a str> {
    if let Some(found) = list.iter().copied().find(|item| item.starts_with(keys)) {
        return Some(found);
    }

    let mut wanted = keys.chars();
    let first = wanted.next()?;
    let rest: Vec<char> = wanted.collect();

    list.iter().copied().find(|item| {
        let mut chars = item.chars();
        if chars.next() != Some(first) {
            return false;
        }
        rest.iter().all(|want| chars.any(|c| c == *want))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BindError, Handler, HostOp, KeymapId, MemoryHost, RawPrefix};
    use crate::keymap::ChordSequence;

    fn engine() -> InputEngine {
        InputEngine::new(Duration::from_millis(350), "Input: ")
    }

    #[test]
    fn test_optional_immediate_pause_is_none() {
        let mut host = MemoryHost::new();
        host.push_pause();
        assert_eq!(engine().collect(&mut host, &InputOptions::optional()), Ok(None));
        assert!(!host.quit_inhibited);
    }

    #[test]
    fn test_optional_one_key_then_pause() {
        let mut host = MemoryHost::new();
        host.type_text("r").push_pause();
        assert_eq!(
            engine().collect(&mut host, &InputOptions::optional()),
            Ok(Some("r".to_string()))
        );
    }

    #[test]
    fn test_optional_uses_pause_window_from_the_start() {
        let mut host = MemoryHost::new();
        host.push_pause();
        engine().collect(&mut host, &InputOptions::optional()).unwrap();
        assert_eq!(host.timeouts, vec![Some(Duration::from_millis(350))]);
    }

    #[test]
    fn test_timed_waits_for_first_key() {
        let mut host = MemoryHost::new();
        host.push_pause().type_text("ab").push_pause();
        let result = engine().collect(&mut host, &InputOptions::timed().prompt("Bookmark: "));
        assert_eq!(result, Ok(Some("ab".to_string())));
        assert_eq!(host.timeouts[0], None);
        assert_eq!(host.prompts, vec!["Bookmark: ", "Bookmark: a", "Bookmark: ab"]);
    }

    #[test]
    fn test_timed_converts_control_letters() {
        let mut host = MemoryHost::new();
        host.push_event(RawEvent::Code(18)) // C-r
            .push_event(RawEvent::Code(2)) // C-b
            .push_pause();
        assert_eq!(
            engine().collect(&mut host, &InputOptions::timed()),
            Ok(Some("rb".to_string()))
        );
    }

    #[test]
    fn test_timed_holds_quit_inhibition_while_reading() {
        struct Probe {
            inner: MemoryHost,
            inhibited_during_reads: Vec<bool>,
        }

        impl Host for Probe {
            fn bind_key(
                &mut self,
                keymap: &KeymapId,
                chords: &ChordSequence,
                handler: Handler,
            ) -> Result<(), BindError> {
                self.inner.bind_key(keymap, chords, handler)
            }
            fn unbind_key(&mut self, keymap: &KeymapId, chords: &ChordSequence) {
                self.inner.unbind_key(keymap, chords)
            }
            fn define_command(&mut self, name: &str, handler: Handler) -> Handler {
                self.inner.define_command(name, handler)
            }
            fn read_key_event(
                &mut self,
                prompt: &str,
                timeout: Option<Duration>,
            ) -> Option<RawEvent> {
                self.inhibited_during_reads.push(self.inner.quit_inhibited);
                self.inner.read_key_event(prompt, timeout)
            }
            fn read_line(&mut self, prompt: &str, initial: Option<&str>) -> String {
                self.inner.read_line(prompt, initial)
            }
            fn pending_prefix(&self) -> Option<RawPrefix> {
                self.inner.pending_prefix()
            }
            fn set_pending_prefix(&mut self, value: Option<RawPrefix>) {
                self.inner.set_pending_prefix(value)
            }
            fn set_quit_inhibited(&mut self, inhibited: bool) {
                self.inner.set_quit_inhibited(inhibited)
            }
            fn signal_quit(&mut self) {
                self.inner.signal_quit()
            }
            fn last_key_events(&self, n: usize) -> Vec<RawEvent> {
                self.inner.last_key_events(n)
            }
        }

        let mut probe = Probe {
            inner: MemoryHost::new(),
            inhibited_during_reads: Vec::new(),
        };
        probe.inner.type_text("xy").push_pause();
        engine().collect(&mut probe, &InputOptions::timed()).unwrap();

        assert_eq!(probe.inhibited_during_reads, vec![true, true, true]);
        assert!(!probe.inner.quit_inhibited);
    }

    #[test]
    fn test_quit_cancels_and_signals_host() {
        let mut host = MemoryHost::new();
        host.type_text("a").push_event(RawEvent::Code(7)).type_text("b");
        let result = engine().collect(&mut host, &InputOptions::timed());

        assert_eq!(result, Err(InputError::Cancelled));
        assert_eq!(host.quit_count(), 1);
        assert_eq!(host.ops.last(), Some(&HostOp::SignalQuit));
        assert!(!host.quit_inhibited);
        assert!(!host.cursor_hollow);
        // Nothing after the quit key is consumed
        assert_eq!(host.remaining_events(), 1);
    }

    #[test]
    fn test_quit_cancels_chars_input() {
        let mut host = MemoryHost::new();
        host.type_text("a").push_event(RawEvent::Code(7)).type_text("b");
        let result = engine().collect(&mut host, &InputOptions::chars(3));

        assert_eq!(result, Err(InputError::Cancelled));
        assert_eq!(host.quit_count(), 1);
        assert!(!host.quit_inhibited);
        assert!(!host.cursor_hollow);
        assert_eq!(host.hollow_at_reads, vec![true, true]);
        assert_eq!(host.remaining_events(), 1);
    }

    #[test]
    fn test_quit_cancels_optional_input() {
        let mut host = MemoryHost::new();
        host.type_text("a").push_event(RawEvent::Code(7)).push_pause();
        let result = engine().collect(&mut host, &InputOptions::optional());

        assert_eq!(result, Err(InputError::Cancelled));
        assert_eq!(host.quit_count(), 1);
        assert_eq!(host.ops, vec![HostOp::SignalQuit]);
        assert!(!host.quit_inhibited);
        assert!(!host.cursor_hollow);
        assert_eq!(host.remaining_events(), 1);
    }

    #[test]
    fn test_quit_as_first_key() {
        let mut host = MemoryHost::new();
        host.push_event(RawEvent::Code(7));
        assert_eq!(
            engine().collect(&mut host, &InputOptions::timed()),
            Err(InputError::Cancelled)
        );
        assert!(!host.quit_inhibited);
    }

    #[test]
    fn test_chars_strips_control() {
        let mut host = MemoryHost::new();
        host.push_event(RawEvent::Code(24)); // C-x
        assert_eq!(
            engine().collect(&mut host, &InputOptions::chars(1)),
            Ok(Some("x".to_string()))
        );
        assert_eq!(host.timeouts, vec![None]);
    }

    #[test]
    fn test_chars_reads_exactly_n() {
        let mut host = MemoryHost::new();
        host.type_text("abc");
        assert_eq!(
            engine().collect(&mut host, &InputOptions::chars(2)),
            Ok(Some("ab".to_string()))
        );
        assert_eq!(host.remaining_events(), 1);
    }

    #[test]
    fn test_line_delegates_to_host() {
        let mut host = MemoryHost::new();
        host.push_line("  raw text ");
        let options = InputOptions::line().prompt("Name: ").initial_input("x");
        assert_eq!(
            engine().collect(&mut host, &options),
            Ok(Some("  raw text ".to_string()))
        );
        assert_eq!(host.prompts, vec!["Name: "]);
        assert_eq!(host.hollow_at_reads, vec![false]);
    }

    #[test]
    fn test_default_prompt() {
        let mut host = MemoryHost::new();
        host.push_line("ok");
        engine().collect(&mut host, &InputOptions::line()).unwrap();
        assert_eq!(host.prompts, vec!["Input: "]);
    }

    #[test]
    fn test_input_with_choices() {
        let mut host = MemoryHost::new();
        host.type_text("d");
        let choices = [("edit", 1), ("delete", 2)];
        assert_eq!(
            engine().input_with_choices(&mut host, Some("Do what?"), &choices),
            Ok(2)
        );
        assert_eq!(host.prompts, vec!["Do what? [e]dit, [d]elete"]);
    }

    #[test]
    fn test_input_with_choices_no_match() {
        let mut host = MemoryHost::new();
        host.type_text("z");
        let choices = [("edit", 1), ("delete", 2)];
        assert_eq!(
            engine().input_with_choices(&mut host, None, &choices),
            Err(InputError::NoMatchingChoice("z".to_string()))
        );
    }

    #[test]
    fn test_read_char_maybe() {
        let mut host = MemoryHost::new();
        host.push_event(RawEvent::Code(6));
        assert_eq!(engine().read_char_maybe(&mut host), Some('f'));

        host.push_pause();
        assert_eq!(engine().read_char_maybe(&mut host), None);
    }

    #[test]
    fn test_filter_by_keys() {
        let list = ["notes", "ruby", "rails"];
        assert_eq!(filter_by_keys(&list, "ra"), Some("rails"));
        assert_eq!(filter_by_keys(&list, "rb"), Some("ruby"));
        assert_eq!(filter_by_keys(&list, "rs"), Some("rails"));
        assert_eq!(filter_by_keys(&list, "x"), None);
    }
}
