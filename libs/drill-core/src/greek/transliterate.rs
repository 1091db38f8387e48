//! Latin keyboard ("greeklish") to Greek script and back.

use super::normalize::strip_accents;

/// A Latin spelling and the Greek letter it stands for (lower, upper).
struct Rule {
    latin: &'static str,
    lower: char,
    upper: char,
}

const fn rule(latin: &'static str, lower: char, upper: char) -> Rule {
    Rule { latin, lower, upper }
}

/// Ordered longest-first so that clusters win over their prefixes.
const RULES: &[Rule] = &[
    rule("th", 'θ', 'Θ'),
    rule("ch", 'χ', 'Χ'),
    rule("kh", 'χ', 'Χ'),
    rule("ph", 'φ', 'Φ'),
    rule("ps", 'ψ', 'Ψ'),
    rule("ks", 'ξ', 'Ξ'),
    rule("a", 'α', 'Α'),
    rule("b", 'β', 'Β'),
    rule("v", 'β', 'Β'),
    rule("g", 'γ', 'Γ'),
    rule("d", 'δ', 'Δ'),
    rule("e", 'ε', 'Ε'),
    rule("z", 'ζ', 'Ζ'),
    rule("h", 'η', 'Η'),
    rule("i", 'ι', 'Ι'),
    rule("j", 'ι', 'Ι'),
    rule("k", 'κ', 'Κ'),
    rule("c", 'κ', 'Κ'),
    rule("q", 'κ', 'Κ'),
    rule("l", 'λ', 'Λ'),
    rule("m", 'μ', 'Μ'),
    rule("n", 'ν', 'Ν'),
    rule("x", 'ξ', 'Ξ'),
    rule("o", 'ο', 'Ο'),
    rule("p", 'π', 'Π'),
    rule("r", 'ρ', 'Ρ'),
    rule("s", 'σ', 'Σ'),
    rule("t", 'τ', 'Τ'),
    rule("u", 'υ', 'Υ'),
    rule("y", 'υ', 'Υ'),
    rule("f", 'φ', 'Φ'),
    rule("w", 'ω', 'Ω'),
];

const MAX_RULE_LEN: usize = 2;

/// Greek letter to its Latin spelling, lowercase.
const REVERSE: &[(char, &str)] = &[
    ('α', "a"),
    ('β', "b"),
    ('γ', "g"),
    ('δ', "d"),
    ('ε', "e"),
    ('ζ', "z"),
    ('η', "h"),
    ('θ', "th"),
    ('ι', "i"),
    ('κ', "k"),
    ('λ', "l"),
    ('μ', "m"),
    ('ν', "n"),
    ('ξ', "x"),
    ('ο', "o"),
    ('π', "p"),
    ('ρ', "r"),
    ('σ', "s"),
    ('ς', "s"),
    ('τ', "t"),
    ('υ', "u"),
    ('φ', "f"),
    ('χ', "ch"),
    ('ψ', "ps"),
    ('ω', "w"),
];

/// Latin-to-Greek transliteration with word-ending options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transliterator {
    /// Render a word-final `s` as `ς`.
    pub final_sigma: bool,
    /// Render a word-final `o` as `ω` (first person verb endings).
    pub terminal_omega: bool,
}

impl Default for Transliterator {
    fn default() -> Self {
        Self {
            final_sigma: true,
            terminal_omega: true,
        }
    }
}

impl Transliterator {
    /// Convert Latin text to Greek. Greedy, left to right, longest match first.
    /// An uppercase letter anywhere in the matched span makes the output uppercase.
    /// Characters without a rule pass through unchanged.
    pub fn to_greek(&self, latin: &str) -> String {
        let chars: Vec<char> = latin.chars().collect();
        let mut out = String::with_capacity(latin.len() * 2);
        let mut i = 0;

        while i < chars.len() {
            let Some((len, rule)) = longest_match(&chars[i..]) else {
                out.push(chars[i]);
                i += 1;
                continue;
            };

            let upper = chars[i..i + len].iter().any(|c| c.is_uppercase());
            let word_final = chars.get(i + len).map_or(true, |c| !c.is_alphabetic());
            let mid_word = i > 0 && chars[i - 1].is_alphabetic();

            let letter = match (rule.lower, upper) {
                ('σ', false) if word_final && self.final_sigma => 'ς',
                ('ο', false) if word_final && mid_word && self.terminal_omega => 'ω',
                ('ο', true) if word_final && mid_word && self.terminal_omega => 'Ω',
                (lower, false) => lower,
                (_, true) => rule.upper,
            };
            out.push(letter);
            i += len;
        }

        out
    }
}

fn longest_match(rest: &[char]) -> Option<(usize, &'static Rule)> {
    let max = MAX_RULE_LEN.min(rest.len());
    (1..=max).rev().find_map(|len| {
        let candidate: String = rest[..len].iter().flat_map(|c| c.to_lowercase()).collect();
        RULES
            .iter()
            .find(|rule| rule.latin == candidate)
            .map(|rule| (len, rule))
    })
}

/// Convert Latin text to Greek with the default word-ending rules.
pub fn to_greek(latin: &str) -> String {
    Transliterator::default().to_greek(latin)
}

/// Convert Greek text to Latin. Accents are dropped; multi-letter spellings
/// are capitalized as `Th`, or `TH` inside an all-caps word.
pub fn to_latin(greek: &str) -> String {
    let chars: Vec<char> = strip_accents(greek).chars().collect();
    let mut out = String::with_capacity(chars.len());

    for (i, &c) in chars.iter().enumerate() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        let Some((_, latin)) = REVERSE.iter().find(|(g, _)| *g == lower) else {
            out.push(c);
            continue;
        };

        if !c.is_uppercase() {
            out.push_str(latin);
            continue;
        }

        let next_upper = chars.get(i + 1).is_some_and(|n| n.is_uppercase());
        let prev_upper = i > 0 && chars[i - 1].is_uppercase();
        let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
        if next_upper || (prev_upper && !next_lower) {
            out.push_str(&latin.to_uppercase());
        } else {
            let mut letters = latin.chars();
            if let Some(first) = letters.next() {
                out.extend(first.to_uppercase());
                out.push_str(letters.as_str());
            }
        }
    }

    out
}
