//! Accent- and case-insensitive canonical form of Greek text.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Monotonic accented vowels and their diaeresis variants.
const ACCENT_TABLE: &[(char, char)] = &[
    ('ά', 'α'),
    ('έ', 'ε'),
    ('ή', 'η'),
    ('ί', 'ι'),
    ('ό', 'ο'),
    ('ύ', 'υ'),
    ('ώ', 'ω'),
    ('ϊ', 'ι'),
    ('ϋ', 'υ'),
    ('ΐ', 'ι'),
    ('ΰ', 'υ'),
    ('Ά', 'Α'),
    ('Έ', 'Ε'),
    ('Ή', 'Η'),
    ('Ί', 'Ι'),
    ('Ό', 'Ο'),
    ('Ύ', 'Υ'),
    ('Ώ', 'Ω'),
    ('Ϊ', 'Ι'),
    ('Ϋ', 'Υ'),
];

const FINAL_SIGMA: char = 'ς';
const SIGMA: char = 'σ';

fn unaccented(c: char) -> char {
    ACCENT_TABLE
        .iter()
        .find(|(accented, _)| *accented == c)
        .map(|(_, base)| *base)
        .unwrap_or(c)
}

/// Remove accents, breathings and iota subscripts while keeping case.
///
/// Monotonic vowels go through the fixed table; anything else (polytonic
/// letters, combining sequences) is decomposed and stripped of its marks.
pub fn strip_accents(text: &str) -> String {
    text.chars()
        .map(unaccented)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .collect()
}

/// Canonical comparison form: no accents, lowercase, medial sigma only,
/// whitespace trimmed and collapsed.
pub fn normalize(text: &str) -> String {
    // Fold case first: lowercasing can itself emit combining marks.
    let folded = strip_accents(&text.to_lowercase());
    folded
        .split_whitespace()
        .map(|word| word.replace(FINAL_SIGMA, &SIGMA.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether two texts are equal after normalization.
pub fn equivalent(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "γράφω",
        "ΓΡΆΦΩ",
        "  Ο   ΔΡΌΜΟΣ ",
        "ἀνθρώπῳ",
        "προϊόν",
        "Ϊ ΰ ΐ",
        "İstanbul",
        "café au lait",
        "λόγος λόγοι",
    ];

    #[test]
    fn strips_monotonic_accents() {
        assert_eq!(normalize("γράφω"), "γραφω");
        assert_eq!(normalize("έχω"), "εχω");
        assert_eq!(normalize("ώ"), "ω");
        assert_eq!(normalize("ή"), "η");
    }

    #[test]
    fn strips_diaeresis_variants() {
        assert_eq!(normalize("προϊόν"), "προιον");
        assert_eq!(normalize("ΐ"), "ι");
        assert_eq!(normalize("Ϋ"), "υ");
    }

    #[test]
    fn strips_polytonic_marks_and_iota_subscript() {
        assert_eq!(normalize("ἀνθρώπῳ"), "ανθρωπω");
        assert_eq!(normalize("ᾄδω"), "αδω");
    }

    #[test]
    fn unifies_final_sigma() {
        assert_eq!(normalize("λόγος"), "λογοσ");
        assert_eq!(normalize("ΛΟΓΟΣ"), "λογοσ");
        assert_eq!(normalize("λόγοσ"), normalize("λόγος"));
    }

    #[test]
    fn folds_case_and_trims() {
        assert_eq!(normalize("  Ο   ΔΡΌΜΟΣ "), "ο δρομοσ");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn handles_decomposed_input() {
        // alpha + combining acute
        assert_eq!(normalize("\u{03B1}\u{0301}"), "α");
    }

    #[test]
    fn normalization_is_idempotent() {
        for sample in SAMPLES {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn accented_variants_are_equivalent() {
        assert!(equivalent("γράφω", "γραφω"));
        assert!(equivalent("ΓΡΆΦΩ", "γράφω"));
        assert!(equivalent("λέω", "λεω"));
        assert!(!equivalent("γράφω", "λέω"));
    }

    #[test]
    fn strip_accents_keeps_case() {
        assert_eq!(strip_accents("Άλφα"), "Αλφα");
        assert_eq!(strip_accents("λόγος"), "λογος");
    }
}
