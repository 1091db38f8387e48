//! Per-user progress summary over review states.

use crate::types::{ReviewState, Stage};
use crate::unlock::{is_learned, UnlockPolicy, UnlockProgress};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Items due within a day with ease below this are at risk of being forgotten.
const AT_RISK_EASE: f64 = 2.0;
const STABLE_EASE: f64 = 2.5;
const STABLE_INTERVAL_DAYS: u32 = 21;

/// Progress statistics for one learner. Archived states are only counted
/// in `archived` and toward `unlock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub relearning: usize,
    pub mastered: usize,
    pub archived: usize,
    pub due_now: usize,
    pub at_risk: usize,
    pub stabilized: usize,
    pub average_ease: f64,
    pub total_attempts: u64,
    pub total_correct: u64,
    /// Percentage of correct attempts, 0-100.
    pub accuracy: f64,
    pub skill_level: u32,
    pub unlock: UnlockProgress,
}

impl ProgressSummary {
    pub fn from_states<'a, I>(states: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a ReviewState>,
    {
        Self::from_states_with(states, now, &UnlockPolicy::default())
    }

    pub fn from_states_with<'a, I>(states: I, now: DateTime<Utc>, policy: &UnlockPolicy) -> Self
    where
        I: IntoIterator<Item = &'a ReviewState>,
    {
        let tomorrow = now + Duration::hours(24);
        let mut summary = Self::empty();
        let mut ease_sum = 0.0;
        let mut learned = 0;

        for state in states {
            if is_learned(state) {
                learned += 1;
            }
            if state.archived_at.is_some() {
                summary.archived += 1;
                continue;
            }

            summary.total += 1;
            match state.stage {
                Stage::New => summary.new += 1,
                Stage::Learning => summary.learning += 1,
                Stage::Review => summary.review += 1,
                Stage::Relearning => summary.relearning += 1,
                Stage::Mastered => summary.mastered += 1,
            }
            if state.due_at <= now {
                summary.due_now += 1;
            }
            if state.due_at <= tomorrow && state.ease_factor < AT_RISK_EASE {
                summary.at_risk += 1;
            }
            if state.ease_factor >= STABLE_EASE && state.interval_days >= STABLE_INTERVAL_DAYS {
                summary.stabilized += 1;
            }
            ease_sum += state.ease_factor;
            summary.total_attempts += u64::from(state.attempts);
            summary.total_correct += u64::from(state.correct_attempts);
        }

        if summary.total > 0 {
            summary.average_ease = ease_sum / summary.total as f64;
        }
        if summary.total_attempts > 0 {
            summary.accuracy = summary.total_correct as f64 / summary.total_attempts as f64 * 100.0;
        }
        summary.skill_level = skill_level(summary.total_correct, summary.accuracy);
        summary.unlock = policy.progress(learned);
        summary
    }

    fn empty() -> Self {
        Self {
            total: 0,
            new: 0,
            learning: 0,
            review: 0,
            relearning: 0,
            mastered: 0,
            archived: 0,
            due_now: 0,
            at_risk: 0,
            stabilized: 0,
            average_ease: 2.5,
            total_attempts: 0,
            total_correct: 0,
            accuracy: 0.0,
            skill_level: 1,
            unlock: UnlockPolicy::default().progress(0),
        }
    }
}

/// Skill level from 1 (beginner) to 10: one level per ten correct answers
/// plus one per twenty points of accuracy.
pub fn skill_level(total_correct: u64, accuracy: f64) -> u32 {
    let experience = total_correct / 10;
    let accuracy_bonus = (accuracy.clamp(0.0, 100.0) / 20.0).floor() as u64;
    (experience + accuracy_bonus + 1).clamp(1, 10) as u32
}
