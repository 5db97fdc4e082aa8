//! Compiling mnemonic names into chord sequences
//!
//! A shortcut is named after what it does; the chords come from the first
//! letter of each word, typed with control held down:
//!
//! ```text
//! enter_yank     → EY   → C-e C-y
//! EY             → EY   → C-e C-y     (letters form, used verbatim)
//! E_Y            → E_Y  → C-e M-y     (underscore-capital is meta)
//! enter__yank    → E_Y  → C-e M-y     (an empty word marks meta)
//! search_copy    → C    → C-c         (isearch keymap)
//! to_1           → T1   → C-t C-1
//! xy             → xy   → x y         (bare lowercase letters)
//! ```

use super::config::KeymapError;
use super::source::MenuItem;
use super::types::{Chord, ChordSequence};

/// Marker for shortcuts bound in the incremental-search keymap
pub const SEARCH_MARKER: &str = "search_";

const SEPARATOR: char = '_';

/// The result of compiling a mnemonic name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledMnemonic {
    /// The name as given
    pub name: String,
    /// Compact letters form, e.g. `EY`
    pub letters: String,
    pub chords: ChordSequence,
    /// Bound in the incremental-search keymap instead of the global one
    pub search: bool,
    /// Written as separate lowercase words (`enter_yank`)
    pub multi_word: bool,
    /// Menu-bar entry for multi-word names
    pub menu_item: Option<MenuItem>,
}

/// Compile a mnemonic name into its chord sequence
pub fn compile(name: &str) -> Result<CompiledMnemonic, KeymapError> {
    let malformed = |reason: &'static str| KeymapError::MalformedMnemonic {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(malformed("empty name"));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == SEPARATOR))
    {
        tracing::debug!("Rejecting mnemonic {:?}: character {:?}", name, bad);
        return Err(malformed("only ASCII letters, digits and '_' are allowed"));
    }

    let (search, body) = match name.strip_prefix(SEARCH_MARKER) {
        Some(rest) => (true, rest),
        None => (false, name),
    };
    if body.is_empty() {
        return Err(malformed("nothing after the search marker"));
    }

    let mut menu_item = None;
    let mut multi_word = false;
    let letters = if search {
        words_to_letters(body).ok_or_else(|| malformed("dangling '_'"))?
    } else if body.chars().any(|c| c.is_ascii_uppercase()) {
        body.to_string()
    } else if body.contains(SEPARATOR) {
        multi_word = true;
        menu_item = menu_item_for(body);
        words_to_letters(body).ok_or_else(|| malformed("dangling '_'"))?
    } else {
        body.to_string()
    };

    let chords = translate_keys(&letters).map_err(malformed)?;
    tracing::debug!("Compiled {:?} → {} ({})", name, letters, chords);

    Ok(CompiledMnemonic {
        name: name.to_string(),
        letters,
        chords,
        search,
        multi_word,
        menu_item,
    })
}

/// Reduce `enter_yank` to `EY`
///
/// Each word keeps its first letter (uppercased) and any characters that are
/// not lowercase letters. An empty word contributes the `_` meta marker for
/// the following letter. Returns None when the name ends in a separator.
pub fn words_to_letters(name: &str) -> Option<String> {
    let mut out = String::new();
    let mut pending_meta = false;

    for word in name.split(SEPARATOR) {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            pending_meta = true;
            continue;
        };
        if pending_meta {
            out.push(SEPARATOR);
            pending_meta = false;
        }
        out.push(first.to_ascii_uppercase());
        out.extend(chars.filter(|c| !c.is_ascii_lowercase()));
    }

    if pending_meta {
        return None;
    }
    Some(out)
}

/// Turn a letters form into chords: `_X` → `M-x`, `x` → `x`, anything else
/// → `C-<lower>`
pub fn translate_keys(letters: &str) -> Result<ChordSequence, &'static str> {
    let mut chords = Vec::with_capacity(letters.len());
    let mut chars = letters.chars();

    while let Some(c) = chars.next() {
        let chord = if c == SEPARATOR {
            match chars.next() {
                Some(next) if next.is_ascii_uppercase() => Chord::meta(next),
                Some(_) => return Err("'_' must be followed by an uppercase letter"),
                None => return Err("dangling '_'"),
            }
        } else if c.is_ascii_lowercase() {
            Chord::char(c)
        } else {
            Chord::ctrl(c)
        };
        chords.push(chord);
    }

    ChordSequence::new(chords).map_err(|_| "no keys")
}

/// Summary form for humans: `enter_yank` → `Control-E Control-Y`
pub fn human_readable(name: &str) -> String {
    let letters = if name.contains(SEPARATOR) && !name.chars().any(|c| c.is_ascii_uppercase()) {
        words_to_letters(name).unwrap_or_default()
    } else {
        name.to_string()
    };

    letters
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| format!("Control-{}", c.to_ascii_uppercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `enter_yank` → menu `Enter`, item `Yank`; numeric items (`to_1`) get none
fn menu_item_for(name: &str) -> Option<MenuItem> {
    let mut words = name
        .split(SEPARATOR)
        .filter(|w| !w.is_empty())
        .map(capitalize);
    let category = words.next()?;
    let label = words.collect::<Vec<_>>().join(" ");

    if label.is_empty() || label.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(MenuItem::new(category, label))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chords(name: &str) -> String {
        compile(name).unwrap().chords.to_string()
    }

    #[test]
    fn test_words_compile_to_control_chords() {
        assert_eq!(chords("enter_yank"), "C-e C-y");
        assert_eq!(chords("to_foo_bar"), "C-t C-f C-b");
    }

    #[test]
    fn test_letters_form_is_used_verbatim() {
        assert_eq!(chords("EY"), "C-e C-y");
        let compiled = compile("EY").unwrap();
        assert_eq!(compiled.letters, "EY");
        assert!(compiled.menu_item.is_none());
    }

    #[test]
    fn test_underscore_capital_is_meta() {
        assert_eq!(chords("E_Y"), "C-e M-y");
        assert_eq!(chords("enter__yank"), "C-e M-y");
        assert_eq!(chords("_enter_yank"), "M-e C-y");
    }

    #[test]
    fn test_lowercase_in_letters_form_is_bare() {
        assert_eq!(chords("Ey"), "C-e y");
    }

    #[test]
    fn test_single_word_compiles_letter_by_letter() {
        assert_eq!(chords("xy"), "x y");
        assert!(compile("xy").unwrap().menu_item.is_none());
    }

    #[test]
    fn test_digit_suffix() {
        let compiled = compile("to_1").unwrap();
        assert_eq!(compiled.letters, "T1");
        assert_eq!(compiled.chords.to_string(), "C-t C-1");
        assert!(compiled.multi_word);
        assert!(compiled.menu_item.is_none());
    }

    #[test]
    fn test_search_marker() {
        let compiled = compile("search_copy").unwrap();
        assert!(compiled.search);
        assert_eq!(compiled.chords.to_string(), "C-c");
        assert!(compiled.menu_item.is_none());

        assert_eq!(chords("search_just_delete"), "C-j C-d");
    }

    #[test]
    fn test_menu_item() {
        let item = compile("enter_yank_all").unwrap().menu_item.unwrap();
        assert_eq!(item.category, "Enter");
        assert_eq!(item.label, "Yank All");
    }

    #[test]
    fn test_malformed_names() {
        for name in ["", "enter-yank", "enter_", "search_", "E_y", "E_", "ümlaut"] {
            assert!(
                matches!(compile(name), Err(KeymapError::MalformedMnemonic { .. })),
                "{:?} should be malformed",
                name
            );
        }
    }

    #[test]
    fn test_token_count_matches_word_count() {
        let names = ["a_b", "open_list_bookmarks", "do_it_now_please", "jump_to_x"];
        for name in names {
            let compiled = compile(name).unwrap();
            let words: Vec<&str> = name.split('_').collect();
            assert_eq!(compiled.chords.len(), words.len());
            for (chord, word) in compiled.chords.chords().iter().zip(&words) {
                let first = word.chars().next().unwrap();
                assert_eq!(chord.to_string(), format!("C-{}", first));
            }
        }
    }

    #[test]
    fn test_human_readable() {
        assert_eq!(human_readable("enter_yank"), "Control-E Control-Y");
        assert_eq!(human_readable("EY"), "Control-E Control-Y");
    }
}
