//! Answer matching for typed and multiple-choice questions.

use crate::greek::{has_latin_letters, is_greek_text, normalize, strip_accents, to_greek};
use crate::settings::{MatchPolicy, Tolerance};
use crate::types::{GradingOutcome, Quality, Verdict};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Grade a typed answer against the expected form.
///
/// Both sides are normalized before comparison. Latin input against a Greek
/// answer is transliterated first. Exact matches score 5, accepted near
/// misses 3 and rejected answers 1. Empty input is graded incorrect.
pub fn check(user_input: &str, correct_answer: &str, policy: &MatchPolicy) -> GradingOutcome {
    let transliterated = is_greek_text(correct_answer) && has_latin_letters(user_input);
    let typed = if transliterated {
        to_greek(user_input)
    } else {
        user_input.to_string()
    };

    let typed_normalized = normalize(&typed);
    let correct_normalized = normalize(correct_answer);

    if typed_normalized.is_empty() {
        return GradingOutcome {
            correct: false,
            quality: Quality::WRONG,
            verdict: Verdict::Incorrect,
            similarity: Some(0.0),
            suggestions: Vec::new(),
            diff: Vec::new(),
        };
    }

    if typed_normalized == correct_normalized {
        return GradingOutcome {
            correct: true,
            quality: Quality::PERFECT,
            verdict: Verdict::Exact,
            similarity: Some(1.0),
            suggestions: surface_suggestions(&typed, correct_answer, transliterated),
            diff: Vec::new(),
        };
    }

    let similarity = normalized_similarity(&typed_normalized, &correct_normalized);
    let close = similarity >= policy.similarity_threshold;
    let diff = diff_answers(&typed_normalized, &correct_normalized);
    let spelling = vec![format!("Check your spelling: {}", correct_answer.trim())];

    match (policy.tolerance, close) {
        (Tolerance::Lenient, true) => GradingOutcome {
            correct: true,
            quality: Quality::PASS,
            verdict: Verdict::NearMiss,
            similarity: Some(similarity),
            suggestions: spelling,
            diff,
        },
        (Tolerance::Strict, true) => GradingOutcome {
            correct: false,
            quality: Quality::WRONG,
            verdict: Verdict::Incorrect,
            similarity: Some(similarity),
            suggestions: spelling,
            diff,
        },
        (_, false) => GradingOutcome {
            correct: false,
            quality: Quality::WRONG,
            verdict: Verdict::Incorrect,
            similarity: Some(similarity),
            suggestions: Vec::new(),
            diff,
        },
    }
}

/// Grade against several accepted answers and keep the best outcome.
pub fn check_any(user_input: &str, accepted: &[&str], policy: &MatchPolicy) -> GradingOutcome {
    accepted
        .iter()
        .map(|answer| check(user_input, answer, policy))
        .max_by(|a, b| {
            rank(a.verdict).cmp(&rank(b.verdict)).then_with(|| {
                a.similarity
                    .unwrap_or(0.0)
                    .total_cmp(&b.similarity.unwrap_or(0.0))
            })
        })
        .unwrap_or_else(|| check(user_input, "", policy))
}

fn rank(verdict: Verdict) -> u8 {
    match verdict {
        Verdict::Exact => 2,
        Verdict::NearMiss => 1,
        Verdict::Incorrect => 0,
    }
}

/// Compare a multiple-choice selection with the correct option.
pub fn compare_choice(selected: &str, correct: &str) -> GradingOutcome {
    let matched = !normalize(selected).is_empty() && normalize(selected) == normalize(correct);
    GradingOutcome {
        correct: matched,
        quality: Quality::from_correct(matched),
        verdict: if matched { Verdict::Exact } else { Verdict::Incorrect },
        similarity: None,
        suggestions: Vec::new(),
        diff: Vec::new(),
    }
}

/// Hints for answers that only differ in accents, case or script.
fn surface_suggestions(typed: &str, correct: &str, transliterated: bool) -> Vec<String> {
    let correct = correct.trim();
    if transliterated {
        return vec![format!("Try Greek characters: {correct}")];
    }

    let typed: String = typed.trim().nfc().collect();
    let correct_nfc: String = correct.nfc().collect();
    let mut suggestions = Vec::new();
    if typed.to_lowercase() != correct_nfc.to_lowercase() {
        suggestions.push(format!("Check accents: {correct}"));
    }
    if strip_accents(&typed) != strip_accents(&correct_nfc)
        && strip_accents(&typed).to_lowercase() == strip_accents(&correct_nfc).to_lowercase()
    {
        suggestions.push(format!("Check capitalization: {correct}"));
    }
    suggestions
}

impl GradingOutcome {
    /// Message shown to the learner after grading.
    pub fn feedback(&self) -> String {
        let first = self.suggestions.first();
        match (self.verdict, first) {
            (Verdict::Exact, _) => "Correct! Well done!".to_string(),
            (Verdict::NearMiss, Some(hint)) => format!("Almost! {hint}"),
            (Verdict::NearMiss, None) => "Almost! Check your spelling carefully.".to_string(),
            (Verdict::Incorrect, _) => {
                let similarity = self.similarity.unwrap_or(0.0);
                if similarity >= 0.9 {
                    match first {
                        Some(hint) => format!("Very close! {hint}"),
                        None => "Very close! Check your spelling carefully.".to_string(),
                    }
                } else if similarity >= 0.7 {
                    "Good attempt! Review the correct form and try again.".to_string()
                } else if similarity >= 0.5 {
                    "Partially correct. Make sure you have the right word form.".to_string()
                } else {
                    match first {
                        Some(hint) => format!("Not quite right. {hint}"),
                        None => "Please try again. Make sure you're using the correct Greek form."
                            .to_string(),
                    }
                }
            }
        }
    }
}

/// Calculate Levenshtein distance between two strings, by character.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity (0.0 to 1.0) based on Levenshtein distance.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiffType {
    /// Text is the same in both strings.
    Same,
    /// Text is in the expected answer but missing from the typed one.
    Added,
    /// Text was typed but is not in the expected answer.
    Removed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffSegment {
    pub text: String,
    pub diff_type: DiffType,
}

/// Diff a typed answer against the expected one: word level for phrases,
/// character level for single words.
pub fn diff_answers(typed: &str, expected: &str) -> Vec<DiffSegment> {
    if expected.split_whitespace().nth(1).is_some() {
        word_diff(typed, expected)
    } else {
        char_diff(typed, expected)
    }
}

/// Character-level diff from a Levenshtein alignment. Substitutions appear
/// as a removed segment followed by an added one.
pub fn char_diff(typed: &str, expected: &str) -> Vec<DiffSegment> {
    let a: Vec<char> = typed.chars().collect();
    let b: Vec<char> = expected.chars().collect();
    let (m, n) = (a.len(), b.len());

    let mut table = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        table[0][j] = j;
    }
    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            table[i][j] = (table[i - 1][j] + 1)
                .min(table[i][j - 1] + 1)
                .min(table[i - 1][j - 1] + cost);
        }
    }

    // Walk back from the corner, collecting operations in reverse.
    let mut ops: Vec<(DiffType, char)> = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1] == b[j - 1] && table[i][j] == table[i - 1][j - 1] {
            ops.push((DiffType::Same, a[i - 1]));
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && table[i][j] == table[i - 1][j - 1] + 1 {
            ops.push((DiffType::Added, b[j - 1]));
            ops.push((DiffType::Removed, a[i - 1]));
            i -= 1;
            j -= 1;
        } else if i > 0 && table[i][j] == table[i - 1][j] + 1 {
            ops.push((DiffType::Removed, a[i - 1]));
            i -= 1;
        } else {
            ops.push((DiffType::Added, b[j - 1]));
            j -= 1;
        }
    }
    ops.reverse();

    let mut segments: Vec<DiffSegment> = Vec::new();
    for (diff_type, c) in ops {
        match segments.last_mut() {
            Some(last) if last.diff_type == diff_type => last.text.push(c),
            _ => segments.push(DiffSegment {
                text: c.to_string(),
                diff_type,
            }),
        }
    }
    segments
}

/// Simple word-level diff between typed and expected answers.
pub fn word_diff(typed: &str, expected: &str) -> Vec<DiffSegment> {
    let typed_words: Vec<&str> = typed.split_whitespace().collect();
    let expected_words: Vec<&str> = expected.split_whitespace().collect();
    let same = |a: &str, b: &str| normalize(a) == normalize(b);

    let mut result = Vec::new();
    let mut push = |text: &str, diff_type: DiffType| {
        result.push(DiffSegment {
            text: text.to_string(),
            diff_type,
        })
    };
    let mut i = 0;
    let mut j = 0;

    while i < typed_words.len() && j < expected_words.len() {
        if same(typed_words[i], expected_words[j]) {
            push(typed_words[i], DiffType::Same);
            i += 1;
            j += 1;
            continue;
        }

        // Typed word shows up a little later in the expected answer: words were skipped.
        let skipped = (j + 1..expected_words.len().min(j + 3))
            .find(|&k| same(typed_words[i], expected_words[k]));
        if let Some(k) = skipped {
            for &word in &expected_words[j..k] {
                push(word, DiffType::Added);
            }
            j = k;
            continue;
        }

        // Expected word shows up a little later in the typed answer: extra words.
        let extra = (i + 1..typed_words.len().min(i + 3))
            .find(|&k| same(expected_words[j], typed_words[k]));
        if let Some(k) = extra {
            for &word in &typed_words[i..k] {
                push(word, DiffType::Removed);
            }
            i = k;
            continue;
        }

        push(typed_words[i], DiffType::Removed);
        push(expected_words[j], DiffType::Added);
        i += 1;
        j += 1;
    }

    for &word in &typed_words[i..] {
        push(word, DiffType::Removed);
    }
    for &word in &expected_words[j..] {
        push(word, DiffType::Added);
    }

    result
}
