//! Core Greek drill library: scheduling and answer checking.
//!
//! Provides:
//! - Greek text normalization, transliteration and input checks
//! - Spaced repetition algorithms (SM-2, pass/fail) and a per-user scheduler
//! - Answer matching for typed mode (Levenshtein similarity) and choice mode
//! - Distractor generation for multiple-choice questions
//! - Session composition from due reviews and budgeted new items
//! - Progressive unlocking of frequency-ranked content
//! - Storage and catalog traits with in-memory implementations

pub mod algorithm;
pub mod catalog;
pub mod date_utils;
pub mod distractors;
pub mod error;
pub mod greek;
pub mod matching;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod stats;
pub mod store;
pub mod types;
pub mod unlock;

pub use algorithm::{algorithm_for, get_algorithm, SpacedRepetitionAlgorithm};
pub use catalog::{ContentCatalog, InMemoryCatalog};
pub use distractors::{pick_distractors, DistractorSet};
pub use error::{Result, SchedulerError, SettingsError, StoreError};
pub use greek::{normalize, strip_accents, to_greek, to_latin, validate_input, Transliterator};
pub use matching::{
    check, check_any, compare_choice, levenshtein_distance, normalized_similarity, DiffSegment,
    DiffType,
};
pub use scheduler::Scheduler;
pub use session::{compose_session, Origin, SessionEntry, SessionQueue};
pub use settings::{
    Algorithm, CategorySettings, EffectiveSettings, GlobalSettings, MatchPolicy, Tolerance,
};
pub use stats::ProgressSummary;
pub use store::{InMemoryStore, ReviewStateStore, SaveOutcome, StoredState, Versioned};
pub use types::{
    Direction, GradingOutcome, InflectedForm, Inflection, Item, ItemId, ItemKind, Quality,
    ReviewState, Stage, UserId, Verdict, VocabPair,
};
pub use unlock::{UnlockPolicy, UnlockProgress};
