//! Prefix arguments: repeat counts and modal flags set before a command
//!
//! The host keeps the raw value; this module reads it into a [`PrefixState`].

use std::fmt;

use super::decode::{RawEvent, CONTROL_BIT};
use crate::host::{Host, RawPrefix};

/// Code of `C-u` in the key history
const UNIVERSAL_CODE: i64 = 21;
/// Code of `C--` in the key history
const CONTROL_MINUS: i64 = CONTROL_BIT + '-' as i64;
/// `C-0` and `C-9` in the key history
const CONTROL_ZERO: i64 = CONTROL_BIT + '0' as i64;
const CONTROL_NINE: i64 = CONTROL_BIT + '9' as i64;

/// The interpreted prefix argument
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PrefixState {
    #[default]
    Absent,
    /// A numeric argument
    Count(i64),
    /// `C--`
    Negative,
    /// `C-u`
    U,
    /// `C-u C-u`
    UU,
    /// `C-u C-u C-u`
    UUU,
    /// Free-form value, possibly a space-delimited list of flags
    Text(String),
}

impl PrefixState {
    /// Interpret the host representation
    pub fn from_raw(raw: Option<&RawPrefix>) -> Self {
        match raw {
            None => PrefixState::Absent,
            Some(RawPrefix::Number(n)) => PrefixState::Count(*n),
            Some(RawPrefix::List(16)) => PrefixState::UU,
            Some(RawPrefix::List(64)) => PrefixState::UUU,
            Some(RawPrefix::List(_)) => PrefixState::U,
            Some(RawPrefix::Text(text)) => match text.as_str() {
                "u" => PrefixState::U,
                "-" => PrefixState::Negative,
                "(16)" => PrefixState::UU,
                "(64)" => PrefixState::UUU,
                t if t.starts_with('(') => PrefixState::U,
                t => match t.parse() {
                    Ok(n) => PrefixState::Count(n),
                    Err(_) => PrefixState::Text(t.to_string()),
                },
            },
        }
    }

    pub fn is_absent(&self) -> bool {
        *self == PrefixState::Absent
    }

    /// Whether a free-form prefix names `flag` (`"u update"` has `update`)
    pub fn has_flag(&self, flag: &str) -> bool {
        match self {
            PrefixState::Text(text) => text.split_whitespace().any(|f| f == flag),
            _ => false,
        }
    }

    /// The value as the host should store it
    pub fn to_raw(&self) -> Option<RawPrefix> {
        match self {
            PrefixState::Absent => None,
            PrefixState::Count(n) => Some(RawPrefix::Number(*n)),
            PrefixState::Negative => Some(RawPrefix::Text("-".to_string())),
            PrefixState::U => Some(RawPrefix::List(4)),
            PrefixState::UU => Some(RawPrefix::List(16)),
            PrefixState::UUU => Some(RawPrefix::List(64)),
            PrefixState::Text(text) => Some(RawPrefix::Text(text.clone())),
        }
    }
}

impl fmt::Display for PrefixState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixState::Absent => Ok(()),
            PrefixState::Count(n) => write!(f, "{}", n),
            PrefixState::Negative => f.write_str("-"),
            PrefixState::U => f.write_str("u"),
            PrefixState::UU => f.write_str("uu"),
            PrefixState::UUU => f.write_str("uuu"),
            PrefixState::Text(text) => f.write_str(text),
        }
    }
}

/// Read the pending prefix; with `clear`, also reset it in the same host call
pub fn current_prefix<H: Host + ?Sized>(host: &mut H, clear: bool) -> PrefixState {
    let raw = if clear {
        host.take_pending_prefix()
    } else {
        host.pending_prefix()
    };
    PrefixState::from_raw(raw.as_ref())
}

pub fn set_prefix<H: Host + ?Sized>(host: &mut H, value: PrefixState) {
    host.set_pending_prefix(value.to_raw());
}

/// Set the prefix, or append to it space-delimited if one is already there
pub fn add_prefix<H: Host + ?Sized>(host: &mut H, value: &str) {
    let combined = match current_prefix(host, false) {
        PrefixState::Absent => value.to_string(),
        existing => format!("{} {}", existing, value),
    };
    host.set_pending_prefix(Some(RawPrefix::Text(combined)));
}

pub fn clear_prefix<H: Host + ?Sized>(host: &mut H) {
    host.set_pending_prefix(None);
}

/// Repeat count for a prefix, running `action` that many times
///
/// `C-u` variants and no prefix count as one repetition. Counts of zero or
/// less run nothing.
pub fn prefix_times(state: &PrefixState, action: Option<&mut dyn FnMut()>) -> i64 {
    let times = match state {
        PrefixState::Absent | PrefixState::U | PrefixState::UU | PrefixState::UUU => 1,
        PrefixState::Count(n) => *n,
        PrefixState::Negative => -1,
        PrefixState::Text(_) => prefix_n(state).unwrap_or(1),
    };

    if let Some(action) = action {
        for _ in 0..times.max(0) {
            action();
        }
    }
    times
}

/// The numeric value of a prefix, or the first number inside a text prefix
pub fn prefix_n(state: &PrefixState) -> Option<i64> {
    match state {
        PrefixState::Count(n) => Some(*n),
        PrefixState::Text(text) => {
            let digits: String = text
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

/// The numeric prefix, or 0
pub fn prefix_or_0(state: &PrefixState) -> i64 {
    match state {
        PrefixState::Count(n) => *n,
        _ => 0,
    }
}

/// Recover the prefix typed before an isearch shortcut from key history
///
/// Isearch consumes the prefix itself, so the key typed just before the
/// `shortcut_len` keys of the shortcut is inspected instead.
pub fn isearch_prefix<H: Host + ?Sized>(host: &H, shortcut_len: usize) -> PrefixState {
    let recent = host.last_key_events(shortcut_len + 1);
    if recent.len() < shortcut_len + 1 {
        return PrefixState::Absent;
    }

    match recent.first() {
        Some(RawEvent::Code(UNIVERSAL_CODE)) => PrefixState::U,
        Some(RawEvent::Code(CONTROL_MINUS)) => PrefixState::Negative,
        Some(RawEvent::Code(code @ CONTROL_ZERO..=CONTROL_NINE)) => {
            PrefixState::Count(code - CONTROL_ZERO)
        }
        _ => PrefixState::Absent,
    }
}
