//! Drill configuration: global settings with per-category overrides.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};

/// Scheduling algorithm options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Quality-aware SM-2.
    Sm2,
    /// SM-2 driven by a binary pass/fail signal only.
    PassFail,
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::Sm2
    }
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sm2 => "sm2",
            Self::PassFail => "pass_fail",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sm2" => Some(Self::Sm2),
            "pass_fail" => Some(Self::PassFail),
            _ => None,
        }
    }
}

/// Strictness applied when comparing typed answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tolerance {
    /// Normalized strings must be equal.
    Strict,
    /// Near misses above the similarity threshold are accepted.
    Lenient,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::Lenient
    }
}

impl Tolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "strict" => Some(Self::Strict),
            "lenient" => Some(Self::Lenient),
            _ => None,
        }
    }
}

/// Answer-matching policy handed to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchPolicy {
    pub tolerance: Tolerance,
    pub similarity_threshold: f64,
}

impl MatchPolicy {
    pub fn strict() -> Self {
        Self {
            tolerance: Tolerance::Strict,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn lenient() -> Self {
        Self {
            tolerance: Tolerance::Lenient,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::lenient()
    }
}

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const MIN_CHOICES: usize = 2;
pub const MAX_CHOICES: usize = 6;

/// Global settings configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub algorithm: Algorithm,
    pub tolerance: Tolerance,
    pub similarity_threshold: f64,
    pub new_items_per_day: u32,
    pub session_size: u32,
    pub daily_reset_hour: u32,
    /// Options shown in multiple-choice mode, correct answer included.
    pub choice_count: usize,
    pub mastered_after_days: u32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            tolerance: Tolerance::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            new_items_per_day: 10,
            session_size: 20,
            daily_reset_hour: 0,
            choice_count: 4,
            mastered_after_days: 90,
        }
    }
}

/// Per-category settings (all fields optional for overrides).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySettings {
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<Tolerance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_items_per_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastered_after_days: Option<u32>,
}

impl CategorySettings {
    /// Create category settings with only the name set.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            algorithm: None,
            tolerance: None,
            similarity_threshold: None,
            new_items_per_day: None,
            session_size: None,
            choice_count: None,
            mastered_after_days: None,
        }
    }
}

/// Effective settings (global merged with category overrides).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub algorithm: Algorithm,
    pub tolerance: Tolerance,
    pub similarity_threshold: f64,
    pub new_items_per_day: u32,
    pub session_size: u32,
    pub daily_reset_hour: u32,
    pub choice_count: usize,
    pub mastered_after_days: u32,
}

impl EffectiveSettings {
    /// Merge global settings with optional category settings.
    pub fn merge(global: &GlobalSettings, category: Option<&CategorySettings>) -> Self {
        match category {
            Some(c) => Self {
                algorithm: c.algorithm.unwrap_or(global.algorithm),
                tolerance: c.tolerance.unwrap_or(global.tolerance),
                similarity_threshold: c.similarity_threshold.unwrap_or(global.similarity_threshold),
                new_items_per_day: c.new_items_per_day.unwrap_or(global.new_items_per_day),
                session_size: c.session_size.unwrap_or(global.session_size),
                daily_reset_hour: global.daily_reset_hour,
                choice_count: c.choice_count.unwrap_or(global.choice_count),
                mastered_after_days: c.mastered_after_days.unwrap_or(global.mastered_after_days),
            },
            None => Self {
                algorithm: global.algorithm,
                tolerance: global.tolerance,
                similarity_threshold: global.similarity_threshold,
                new_items_per_day: global.new_items_per_day,
                session_size: global.session_size,
                daily_reset_hour: global.daily_reset_hour,
                choice_count: global.choice_count,
                mastered_after_days: global.mastered_after_days,
            },
        }
    }

    /// Reject values the drill components cannot honor.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(SettingsError::InvalidThreshold(self.similarity_threshold));
        }
        if self.daily_reset_hour > 23 {
            return Err(SettingsError::InvalidResetHour(self.daily_reset_hour));
        }
        if !(MIN_CHOICES..=MAX_CHOICES).contains(&self.choice_count) {
            return Err(SettingsError::InvalidChoiceCount(self.choice_count));
        }
        Ok(())
    }

    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            tolerance: self.tolerance,
            similarity_threshold: self.similarity_threshold,
        }
    }
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self::merge(&GlobalSettings::default(), None)
    }
}
