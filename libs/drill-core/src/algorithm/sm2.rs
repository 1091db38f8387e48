//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2 with configurable parameters. Quality runs 0..=5;
//! anything below 3 is a failure that sends the item back to relearning.

use super::SpacedRepetitionAlgorithm;
use crate::types::{Quality, ReviewState, Stage};
use chrono::{DateTime, Duration, Utc};

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Ease lost on a failed review.
    pub lapse_penalty: f64,
    pub first_interval: u32,
    pub second_interval: u32,
    pub relearn_interval: u32,
    /// Intervals beyond this many days are labelled mastered.
    pub mastered_after_days: u32,
    /// Longest interval ever scheduled, in days.
    pub maximum_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            lapse_penalty: 0.2,
            first_interval: 1,
            second_interval: 6,
            relearn_interval: 1,
            mastered_after_days: 90,
            maximum_interval: 36_500,
        }
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self, now: DateTime<Utc>) -> ReviewState {
        ReviewState::new(self.initial_ease, now)
    }

    fn schedule(&self, state: &ReviewState, quality: Quality, now: DateTime<Utc>) -> ReviewState {
        let mut next = state.clone();
        next.attempts += 1;
        next.last_reviewed_at = Some(now);

        if quality.passed() {
            next.correct_attempts += 1;
            next.streak += 1;
            next.ease_factor = self.adjusted_ease(state.ease_factor, quality);
            next.repetitions = state.repetitions + 1;
            next.interval_days = match next.repetitions {
                1 => self.first_interval,
                2 => self.second_interval,
                _ => self.grown_interval(state.interval_days, next.ease_factor),
            }
            .min(self.maximum_interval);
            next.stage = self.success_stage(state.stage, next.interval_days);
        } else {
            next.streak = 0;
            next.repetitions = 0;
            next.lapses = state.lapses + 1;
            next.ease_factor = self.clamp_ease(state.ease_factor - self.lapse_penalty);
            next.interval_days = self.relearn_interval.min(self.maximum_interval);
            next.stage = Stage::Relearning;
        }

        next.due_at = now
            .checked_add_signed(Duration::days(i64::from(next.interval_days)))
            .unwrap_or(now);
        next
    }
}

impl Sm2 {
    /// Standard SM-2 ease update: perfect answers raise ease, hesitant ones lower it.
    fn adjusted_ease(&self, ease: f64, quality: Quality) -> f64 {
        let miss = f64::from(5 - quality.value());
        self.clamp_ease(ease + (0.1 - miss * (0.08 + miss * 0.02)))
    }

    fn grown_interval(&self, previous: u32, ease: f64) -> u32 {
        let grown = (f64::from(previous) * ease).round();
        if grown.is_finite() {
            grown.min(f64::from(self.maximum_interval)) as u32
        } else {
            self.maximum_interval
        }
    }

    fn clamp_ease(&self, ease: f64) -> f64 {
        if ease.is_finite() {
            ease.max(self.minimum_ease)
        } else {
            self.minimum_ease
        }
    }

    fn success_stage(&self, previous: Stage, interval_days: u32) -> Stage {
        match previous {
            Stage::New => Stage::Learning,
            _ if interval_days > self.mastered_after_days => Stage::Mastered,
            _ => Stage::Review,
        }
    }
}
