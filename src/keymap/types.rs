//! Core chord types: Modifiers, KeyCode, Chord, ChordSequence

use std::fmt;
use std::str::FromStr;

use super::config::KeymapError;

/// Modifier keys as a bitfield
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b01);
    pub const META: Modifiers = Modifiers(0b10);

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b01;
        }
        if meta {
            bits |= 0b10;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b01 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b10 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    /// Renders the kbd-style prefix, e.g. `C-M-`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl() {
            f.write_str("C-")?;
        }
        if self.meta() {
            f.write_str("M-")?;
        }
        Ok(())
    }
}

/// The base key of a chord
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    /// A character key (letters normalized to lowercase)
    Char(char),

    Tab,
    Return,
    Backspace,
    Space,

    Up,
    Down,
    Left,
    Right,
}

impl KeyCode {
    /// Name used inside angle brackets (`<tab>`), None for characters
    fn bracket_name(self) -> Option<&'static str> {
        match self {
            KeyCode::Char(_) => None,
            KeyCode::Tab => Some("tab"),
            KeyCode::Return => Some("return"),
            KeyCode::Backspace => Some("backspace"),
            KeyCode::Space => Some("space"),
            KeyCode::Up => Some("up"),
            KeyCode::Down => Some("down"),
            KeyCode::Left => Some("left"),
            KeyCode::Right => Some("right"),
        }
    }

    fn from_name(name: &str) -> Option<KeyCode> {
        match name {
            "tab" | "TAB" => Some(KeyCode::Tab),
            "return" | "RET" => Some(KeyCode::Return),
            "backspace" | "DEL" => Some(KeyCode::Backspace),
            "space" | "SPC" => Some(KeyCode::Space),
            "up" => Some(KeyCode::Up),
            "down" => Some(KeyCode::Down),
            "left" => Some(KeyCode::Left),
            "right" => Some(KeyCode::Right),
            _ => None,
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{}", c),
            other => write!(f, "<{}>", other.bracket_name().unwrap_or_default()),
        }
    }
}

/// A single chord: a key with modifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chord {
    pub key: KeyCode,
    pub mods: Modifiers,
}

impl Chord {
    pub const fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self { key, mods }
    }

    /// A bare character with no modifier
    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c.to_ascii_lowercase()), Modifiers::NONE)
    }

    /// Control + character
    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c.to_ascii_lowercase()), Modifiers::CTRL)
    }

    /// Meta + character
    pub fn meta(c: char) -> Self {
        Self::new(KeyCode::Char(c.to_ascii_lowercase()), Modifiers::META)
    }

    /// Whether this chord carries a control or meta modifier
    pub fn is_modified(&self) -> bool {
        !self.mods.is_empty()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mods, self.key)
    }
}

impl FromStr for Chord {
    type Err = KeymapError;

    /// Parse a single kbd-style token: `C-e`, `M-y`, `C-<tab>`, `x`, `RET`
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut mods = Modifiers::NONE;
        let mut rest = token;

        loop {
            if let Some(r) = rest.strip_prefix("C-").filter(|r| !r.is_empty()) {
                mods = mods | Modifiers::CTRL;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("M-").filter(|r| !r.is_empty()) {
                mods = mods | Modifiers::META;
                rest = r;
            } else {
                break;
            }
        }

        let key = if let Some(name) = rest.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
            KeyCode::from_name(name)
        } else {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c.to_ascii_lowercase())),
                _ => KeyCode::from_name(rest),
            }
        };

        key.map(|key| Chord::new(key, mods))
            .ok_or_else(|| KeymapError::InvalidChord(token.to_string()))
    }
}

/// An ordered, non-empty list of chords forming one shortcut
///
/// Equality, ordering and hashing follow the canonical string form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChordSequence(Vec<Chord>);

impl ChordSequence {
    /// Build a sequence, rejecting an empty chord list
    pub fn new(chords: Vec<Chord>) -> Result<Self, KeymapError> {
        if chords.is_empty() {
            return Err(KeymapError::InvalidChord(String::new()));
        }
        Ok(Self(chords))
    }

    pub fn chords(&self) -> &[Chord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed sequence
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` is a strict prefix of `other`
    pub fn is_prefix_of(&self, other: &ChordSequence) -> bool {
        self.0.len() < other.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// All strict, non-empty prefixes, shortest first
    pub fn prefixes(&self) -> impl Iterator<Item = ChordSequence> + '_ {
        (1..self.0.len()).map(|n| ChordSequence(self.0[..n].to_vec()))
    }

    /// Whether the sequence contains this chord anywhere
    pub fn contains(&self, chord: &Chord) -> bool {
        self.0.contains(chord)
    }

    /// Replace every occurrence of `from` with `to`
    pub fn replace(&self, from: Chord, to: Chord) -> ChordSequence {
        ChordSequence(
            self.0
                .iter()
                .map(|c| if *c == from { to } else { *c })
                .collect(),
        )
    }
}

impl fmt::Display for ChordSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chord) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", chord)?;
        }
        Ok(())
    }
}

impl FromStr for ChordSequence {
    type Err = KeymapError;

    /// Parse a space-separated kbd-style description: `C-x C-f`
    fn from_str(desc: &str) -> Result<Self, Self::Err> {
        let chords = desc
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Chord>, _>>()?;
        if chords.is_empty() {
            return Err(KeymapError::InvalidChord(desc.to_string()));
        }
        Ok(Self(chords))
    }
}

impl serde::Serialize for ChordSequence {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
