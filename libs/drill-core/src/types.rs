//! Core types for the drill library.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a learner.
pub type UserId = i64;

/// Identifier of a practiceable item in the content catalog.
pub type ItemId = i64;

/// Grammatical tense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tense {
    Present,
    Imperfect,
    Aorist,
    Future,
    FutureContinuous,
    Perfect,
    Pluperfect,
    FuturePerfect,
}

/// Grammatical mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Indicative,
    Subjunctive,
    Imperative,
    Participle,
    Infinitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voice {
    Active,
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Person {
    First,
    Second,
    Third,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Number {
    Singular,
    Plural,
}

/// Grammatical case of nouns, adjectives and articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Case {
    Nominative,
    Genitive,
    Accusative,
    Vocative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Masculine,
    Feminine,
    Neuter,
}

/// Grammatical category tuple identifying one cell of a paradigm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inflection {
    Verb {
        tense: Tense,
        mood: Mood,
        voice: Voice,
        #[serde(skip_serializing_if = "Option::is_none")]
        person: Option<Person>,
        #[serde(skip_serializing_if = "Option::is_none")]
        number: Option<Number>,
    },
    Nominal {
        case: Case,
        number: Number,
        #[serde(skip_serializing_if = "Option::is_none")]
        gender: Option<Gender>,
    },
}

/// A specific inflected form of a lexeme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflectedForm {
    pub surface: String,
    pub inflection: Inflection,
}

/// Which side of a vocabulary pair is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    GreekToEnglish,
    EnglishToGreek,
}

impl Default for Direction {
    fn default() -> Self {
        Self::GreekToEnglish
    }
}

/// A vocabulary pair. `english` may hold several meanings separated by `;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabPair {
    pub greek: String,
    pub english: String,
    #[serde(default)]
    pub direction: Direction,
}

impl VocabPair {
    /// Prompt shown to the learner.
    pub fn prompt(&self) -> &str {
        match self.direction {
            Direction::GreekToEnglish => &self.greek,
            Direction::EnglishToGreek => first_meaning(&self.english),
        }
    }

    /// Canonical expected answer (first meaning for English answers).
    pub fn expected_answer(&self) -> &str {
        match self.direction {
            Direction::GreekToEnglish => first_meaning(&self.english),
            Direction::EnglishToGreek => &self.greek,
        }
    }

    /// Every answer that should be graded as correct.
    pub fn accepted_answers(&self) -> Vec<&str> {
        match self.direction {
            Direction::GreekToEnglish => self
                .english
                .split(';')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .collect(),
            Direction::EnglishToGreek => vec![self.greek.as_str()],
        }
    }
}

fn first_meaning(english: &str) -> &str {
    english.split(';').next().unwrap_or_default().trim()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Form(InflectedForm),
    Vocabulary(VocabPair),
}

/// Atomic practiceable unit owned by the content catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Lexeme the item belongs to; inflected forms of one lexeme are siblings.
    pub lexeme_id: i64,
    pub category: String,
    pub kind: ItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_rank: Option<u32>,
}

impl Item {
    /// The surface form the learner is expected to produce.
    pub fn expected_answer(&self) -> &str {
        match &self.kind {
            ItemKind::Form(form) => &form.surface,
            ItemKind::Vocabulary(pair) => pair.expected_answer(),
        }
    }

    pub fn accepted_answers(&self) -> Vec<&str> {
        match &self.kind {
            ItemKind::Form(form) => vec![form.surface.as_str()],
            ItemKind::Vocabulary(pair) => pair.accepted_answers(),
        }
    }
}

/// Learning stage of a review record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    New,
    Learning,
    Review,
    Relearning,
    Mastered,
}

impl Default for Stage {
    fn default() -> Self {
        Self::New
    }
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Relearning => "relearning",
            Self::Mastered => "mastered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "learning" => Some(Self::Learning),
            "review" => Some(Self::Review),
            "relearning" => Some(Self::Relearning),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

/// Answer quality on the 0-5 scale. Values below 3 are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(u8);

impl Quality {
    pub const PERFECT: Self = Self(5);
    pub const GOOD: Self = Self(4);
    pub const PASS: Self = Self(3);
    pub const FAIL: Self = Self(2);
    pub const WRONG: Self = Self(1);
    pub const BLACKOUT: Self = Self(0);

    /// Create from a raw value, clamping to 0-5.
    pub fn new(value: u8) -> Self {
        Self(value.min(5))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn passed(self) -> bool {
        self.0 >= 3
    }

    /// Map a binary answer without a finer signal.
    /// Correct -> Good (4), incorrect -> Fail (2)
    pub fn from_correct(correct: bool) -> Self {
        if correct { Self::GOOD } else { Self::FAIL }
    }
}

/// Scheduling record for one (user, item) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub lapses: u32,
    pub due_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub stage: Stage,
    /// First exposure to the learner.
    pub introduced_at: DateTime<Utc>,
    pub attempts: u32,
    pub correct_attempts: u32,
    /// Consecutive correct answers, reset on any failure.
    pub streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl ReviewState {
    /// Fresh record for an item first shown at `now`.
    pub fn new(initial_ease: f64, now: DateTime<Utc>) -> Self {
        Self {
            ease_factor: initial_ease,
            interval_days: 0,
            repetitions: 0,
            lapses: 0,
            due_at: now,
            last_reviewed_at: None,
            stage: Stage::New,
            introduced_at: now,
            attempts: 0,
            correct_attempts: 0,
            streak: 0,
            archived_at: None,
        }
    }

    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.archived_at.is_none() && self.due_at <= as_of
    }
}

/// Classification of a graded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Exact,
    NearMiss,
    Incorrect,
}

/// Result of grading one response. Consumed by the scheduler, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingOutcome {
    pub correct: bool,
    pub quality: Quality,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diff: Vec<crate::matching::DiffSegment>,
}
