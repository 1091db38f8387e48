//! Spaced repetition algorithm implementations.

pub mod pass_fail;
pub mod sm2;

use crate::settings::{Algorithm, EffectiveSettings};
use crate::types::{Quality, ReviewState};
use chrono::{DateTime, Utc};

/// Trait for spaced repetition algorithms.
///
/// Implementations are pure: they compute the next state in memory and
/// leave persistence to the caller.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// State for an item first shown at `now`.
    fn initial_state(&self, now: DateTime<Utc>) -> ReviewState;

    /// Next review state after a graded answer.
    fn schedule(&self, state: &ReviewState, quality: Quality, now: DateTime<Utc>) -> ReviewState;
}

/// Get algorithm by setting.
pub fn get_algorithm(algorithm: Algorithm) -> Box<dyn SpacedRepetitionAlgorithm> {
    match algorithm {
        Algorithm::Sm2 => Box::new(sm2::Sm2::default()),
        Algorithm::PassFail => Box::new(pass_fail::PassFail::default()),
    }
}

/// Algorithm configured from merged settings.
pub fn algorithm_for(settings: &EffectiveSettings) -> Box<dyn SpacedRepetitionAlgorithm> {
    let sm2 = sm2::Sm2 {
        mastered_after_days: settings.mastered_after_days,
        ..sm2::Sm2::default()
    };
    match settings.algorithm {
        Algorithm::Sm2 => Box::new(sm2),
        Algorithm::PassFail => Box::new(pass_fail::PassFail::new(sm2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithms_resolve_by_setting() {
        assert_eq!(get_algorithm(Algorithm::Sm2).name(), "sm2");
        assert_eq!(get_algorithm(Algorithm::PassFail).name(), "pass_fail");
    }

    #[test]
    fn settings_choose_algorithm() {
        let settings = EffectiveSettings {
            algorithm: Algorithm::PassFail,
            ..EffectiveSettings::default()
        };
        assert_eq!(algorithm_for(&settings).name(), "pass_fail");
        assert_eq!(algorithm_for(&EffectiveSettings::default()).name(), "sm2");
    }
}
