//! Script detection and input checks for typed answers.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Inputs longer than this get a warning.
pub const LONG_INPUT_CHARS: usize = 200;

fn is_greek_char(c: char) -> bool {
    matches!(c as u32, 0x0370..=0x03FF | 0x1F00..=0x1FFF)
}

/// Whether the text contains at least one Greek character.
pub fn is_greek_text(text: &str) -> bool {
    text.chars().any(is_greek_char)
}

/// Whether the text contains ASCII Latin letters.
pub fn has_latin_letters(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphabetic())
}

/// Report on a piece of learner input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputReport {
    pub valid: bool,
    /// NFC form of the trimmed input.
    pub normalized: String,
    pub has_greek: bool,
    /// Characters excluding whitespace.
    pub character_count: usize,
    pub invalid_characters: Vec<char>,
    pub warnings: Vec<String>,
}

/// Inspect input before grading. Never fails; problems are reported.
pub fn validate_input(text: &str) -> InputReport {
    let normalized: String = text.trim().nfc().collect();
    if normalized.is_empty() {
        return InputReport {
            valid: false,
            normalized,
            has_greek: false,
            character_count: 0,
            invalid_characters: Vec::new(),
            warnings: vec!["empty input".to_string()],
        };
    }

    let has_greek = is_greek_text(&normalized);
    let character_count = normalized.chars().filter(|c| !c.is_whitespace()).count();

    let mut invalid_characters = Vec::new();
    for c in normalized.chars() {
        let allowed = c.is_whitespace()
            || is_greek_char(c)
            || c.is_ascii()
            || is_punctuation(c)
            || is_combining(c);
        if !allowed && !invalid_characters.contains(&c) {
            invalid_characters.push(c);
        }
    }

    let mut warnings = Vec::new();
    if has_greek && has_latin_letters(&normalized) {
        warnings.push("mixed Greek and Latin characters".to_string());
    }
    if character_count > LONG_INPUT_CHARS {
        warnings.push("input is unusually long".to_string());
    }

    InputReport {
        valid: true,
        normalized,
        has_greek,
        character_count,
        invalid_characters,
        warnings,
    }
}

// Quotes, dashes and the ano teleia used in Greek text.
fn is_punctuation(c: char) -> bool {
    matches!(c, '«' | '»' | '·' | '\u{2010}'..='\u{2027}')
}

fn is_combining(c: char) -> bool {
    unicode_normalization::char::is_combining_mark(c)
}
