//! Binary scheduling: every answer is either right or wrong.

use super::sm2::Sm2;
use super::SpacedRepetitionAlgorithm;
use crate::types::{Quality, ReviewState};
use chrono::{DateTime, Utc};

/// SM-2 driven by a collapsed quality signal. Any pass is scheduled as
/// `Quality::GOOD`, any failure as `Quality::FAIL`, so ease never drifts on
/// near misses.
#[derive(Debug, Clone, Default)]
pub struct PassFail {
    inner: Sm2,
}

impl PassFail {
    pub fn new(inner: Sm2) -> Self {
        Self { inner }
    }
}

impl SpacedRepetitionAlgorithm for PassFail {
    fn name(&self) -> &'static str {
        "pass_fail"
    }

    fn initial_state(&self, now: DateTime<Utc>) -> ReviewState {
        self.inner.initial_state(now)
    }

    fn schedule(&self, state: &ReviewState, quality: Quality, now: DateTime<Utc>) -> ReviewState {
        let collapsed = Quality::from_correct(quality.passed());
        self.inner.schedule(state, collapsed, now)
    }
}
