//! Decoding of raw host key events
//!
//! Hosts report keys either as integer codes or as textual tokens for
//! special keys. Control and meta chords outside the plain character range
//! arrive as large integers with the modifier folded into high bits:
//!
//! ```text
//! 67108864  + c   control chord (C-. C-/ C-0..C-9 ...)
//! 134217728 + c   meta chord    (M-a .. M-z)
//! 1 ..= 26        classic control letters (C-a .. C-z)
//! ```

use std::fmt;

/// Offset of the control bit in chord codes
pub const CONTROL_BIT: i64 = 67_108_864;
/// Offset of the meta bit in chord codes
pub const META_BIT: i64 = 134_217_728;

/// The quit key (control-G)
pub const QUIT_CODE: i64 = 7;

const META_LETTERS: std::ops::RangeInclusive<i64> = 134_217_825..=134_217_850;
const CONTROL_CHORDS: std::ops::RangeInclusive<i64> = 67_108_896..=67_108_925;
const CONTROL_DIGITS: std::ops::RangeInclusive<i64> = 67_108_912..=67_108_921;
const CONTROL_PERIOD: i64 = 67_108_910;
const CONTROL_SLASH: i64 = 67_108_911;

/// A raw event as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    Code(i64),
    Token(String),
}

impl RawEvent {
    pub fn token(name: impl Into<String>) -> Self {
        RawEvent::Token(name.into())
    }

    /// Whether this is the quit key
    pub fn is_quit(&self) -> bool {
        *self == RawEvent::Code(QUIT_CODE)
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawEvent::Code(code) => write!(f, "{}", code),
            RawEvent::Token(token) => f.write_str(token),
        }
    }
}

/// A decoded key symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Left,
    Right,
    Up,
    Down,
    Return,
    MetaReturn,
    ControlReturn,
    Backspace,
    ControlPeriod,
    ControlSlash,
    Meta(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char('\t') => f.write_str("tab"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Left => f.write_str("left"),
            Key::Right => f.write_str("right"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
            Key::Return => f.write_str("return"),
            Key::MetaReturn => f.write_str("meta_return"),
            Key::ControlReturn => f.write_str("control_return"),
            Key::Backspace => f.write_str("backspace"),
            Key::ControlPeriod => f.write_str("control_period"),
            Key::ControlSlash => f.write_str("control_slash"),
            Key::Meta(c) => write!(f, "meta_{}", c),
        }
    }
}

/// A decoded event: the symbol (if recognized) and the raw code (if any)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Option<Key>,
    pub code: Option<i64>,
}

impl KeyEvent {
    const fn new(key: Key, code: i64) -> Self {
        Self {
            key: Some(key),
            code: Some(code),
        }
    }

    /// An unrecognized event, e.g. from the mouse
    pub const UNKNOWN: KeyEvent = KeyEvent {
        key: None,
        code: None,
    };

    /// The plain character, if the key is one
    pub fn character(&self) -> Option<char> {
        match self.key {
            Some(Key::Char(c)) => Some(c),
            _ => None,
        }
    }
}

/// Decode a raw host event into a key symbol
pub fn decode(event: &RawEvent) -> KeyEvent {
    match event {
        RawEvent::Token(token) => decode_token(token),
        RawEvent::Code(raw) => decode_code(*raw),
    }
}

fn decode_token(token: &str) -> KeyEvent {
    match token {
        // Arrows carry 0 as an arbitrary marker code
        "left" => KeyEvent::new(Key::Left, 0),
        "right" => KeyEvent::new(Key::Right, 0),
        "up" => KeyEvent::new(Key::Up, 0),
        "down" => KeyEvent::new(Key::Down, 0),
        "A-return" => KeyEvent::new(Key::MetaReturn, 13),
        "C-return" => KeyEvent::new(Key::ControlReturn, 13),
        "return" => KeyEvent::new(Key::Return, 13),
        "backspace" => KeyEvent::new(Key::Backspace, 127),
        "tab" => KeyEvent::new(Key::Char('\t'), 9),
        _ => KeyEvent::UNKNOWN,
    }
}

fn decode_code(raw: i64) -> KeyEvent {
    if META_LETTERS.contains(&raw) {
        return match code_char(raw - META_BIT) {
            Some(c) => KeyEvent::new(Key::Meta(c), raw),
            None => KeyEvent::UNKNOWN,
        };
    }

    let key = match raw {
        CONTROL_PERIOD => Some(Key::ControlPeriod),
        CONTROL_SLASH => Some(Key::ControlSlash),
        r if CONTROL_DIGITS.contains(&r) => code_char(r - CONTROL_BIT).map(Key::Char),
        r => code_char(r).map(Key::Char),
    };

    KeyEvent {
        key,
        code: Some(raw),
    }
}

fn code_char(code: i64) -> Option<char> {
    u32::try_from(code).ok().and_then(char::from_u32)
}

/// Normalize a raw code to the plain character it was typed with
///
/// Control and meta modifiers are stripped; `0` (the arrow marker) reads as
/// a space.
pub fn to_letter(code: i64) -> Option<char> {
    letter_with_modifier(code).map(|(c, _)| c)
}

/// Like [`to_letter`], keeping the stripped modifier as a `C-`/`M-` prefix
pub fn to_letter_verbose(code: i64) -> Option<String> {
    letter_with_modifier(code).map(|(c, modifier)| format!("{}{}", modifier, c))
}

fn letter_with_modifier(code: i64) -> Option<(char, &'static str)> {
    match code {
        0 => Some((' ', "")),
        1..=26 => code_char(code + 96).map(|c| (c, "C-")),
        c if CONTROL_CHORDS.contains(&c) => code_char(c - CONTROL_BIT).map(|c| (c, "C-")),
        c if META_LETTERS.contains(&c) => code_char(c - META_BIT).map(|c| (c, "M-")),
        c => code_char(c).map(|c| (c, "")),
    }
}

/// Strip a control modifier from a raw code, leaving other codes alone
pub fn remove_control(code: i64) -> Option<char> {
    match code {
        1..=26 => code_char(code + 96),
        c if CONTROL_CHORDS.contains(&c) => code_char(c - CONTROL_BIT),
        c => code_char(c),
    }
}

/// Collapse typed codes into their uppercase letters (`[5, 25]` → `"EY"`)
pub fn sequence_to_letters(codes: &[i64]) -> String {
    codes
        .iter()
        .filter_map(|&code| to_letter(code))
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: i64) -> RawEvent {
        RawEvent::Code(raw)
    }

    #[test]
    fn test_arrow_tokens_use_zero_marker() {
        assert_eq!(
            decode(&RawEvent::token("left")),
            KeyEvent::new(Key::Left, 0)
        );
        assert_eq!(decode(&RawEvent::token("down")), KeyEvent::new(Key::Down, 0));
    }

    #[test]
    fn test_return_variants() {
        assert_eq!(
            decode(&RawEvent::token("A-return")),
            KeyEvent::new(Key::MetaReturn, 13)
        );
        assert_eq!(
            decode(&RawEvent::token("C-return")),
            KeyEvent::new(Key::ControlReturn, 13)
        );
        assert_eq!(
            decode(&RawEvent::token("return")),
            KeyEvent::new(Key::Return, 13)
        );
        assert_eq!(
            decode(&RawEvent::token("backspace")),
            KeyEvent::new(Key::Backspace, 127)
        );
        assert_eq!(decode(&RawEvent::token("tab")).character(), Some('\t'));
    }

    #[test]
    fn test_unknown_token_is_unknown() {
        assert_eq!(decode(&RawEvent::token("mouse-1")), KeyEvent::UNKNOWN);
    }

    #[test]
    fn test_meta_range() {
        for raw in META_LETTERS {
            let expected = char::from_u32((raw - META_BIT) as u32).unwrap();
            assert_eq!(decode(&code(raw)).key, Some(Key::Meta(expected)));
        }
        assert_eq!(decode(&code(134_217_825)).key, Some(Key::Meta('a')));
        assert_eq!(decode(&code(134_217_850)).key, Some(Key::Meta('z')));
    }

    #[test]
    fn test_control_digits() {
        for raw in CONTROL_DIGITS {
            let expected = char::from_u32((raw - CONTROL_BIT) as u32).unwrap();
            assert_eq!(decode(&code(raw)).character(), Some(expected));
        }
        assert_eq!(decode(&code(67_108_912)).character(), Some('0'));
    }

    #[test]
    fn test_control_period_and_slash() {
        assert_eq!(decode(&code(67_108_910)).key, Some(Key::ControlPeriod));
        assert_eq!(decode(&code(67_108_911)).key, Some(Key::ControlSlash));
    }

    #[test]
    fn test_plain_code_falls_back_to_character() {
        let event = decode(&code('r' as i64));
        assert_eq!(event.character(), Some('r'));
        assert_eq!(event.code, Some('r' as i64));
    }

    #[test]
    fn test_out_of_range_code_keeps_raw_code() {
        let event = decode(&code(-4));
        assert_eq!(event.key, None);
        assert_eq!(event.code, Some(-4));
    }

    #[test]
    fn test_to_letter() {
        assert_eq!(to_letter(0), Some(' '));
        assert_eq!(to_letter(5), Some('e'));
        assert_eq!(to_letter(26), Some('z'));
        assert_eq!(to_letter(67_108_910), Some('.'));
        assert_eq!(to_letter(134_217_848), Some('x'));
        assert_eq!(to_letter('q' as i64), Some('q'));
    }

    #[test]
    fn test_to_letter_control_chord_round_trip() {
        for letter in 'a'..='z' {
            let classic = letter as i64 - 96;
            assert_eq!(to_letter(classic), Some(letter));
        }
        for c in ' '..='=' {
            assert_eq!(to_letter(c as i64 + CONTROL_BIT), Some(c));
        }
    }

    #[test]
    fn test_to_letter_verbose() {
        assert_eq!(to_letter_verbose(5).as_deref(), Some("C-e"));
        assert_eq!(to_letter_verbose(134_217_825).as_deref(), Some("M-a"));
        assert_eq!(to_letter_verbose(0).as_deref(), Some(" "));
        assert_eq!(to_letter_verbose('k' as i64).as_deref(), Some("k"));
    }

    #[test]
    fn test_remove_control() {
        assert_eq!(remove_control(24), Some('x'));
        assert_eq!(remove_control('x' as i64), Some('x'));
        assert_eq!(remove_control(67_108_913), Some('1'));
    }

    #[test]
    fn test_sequence_to_letters() {
        assert_eq!(sequence_to_letters(&[5, 25]), "EY");
    }

    #[test]
    fn test_quit_detection() {
        assert!(code(7).is_quit());
        assert!(!code(8).is_quit());
    }
}
