//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up an in-memory database with catalog content
//! - Helper functions for schedulers and seeded randomness

#![allow(dead_code)]

pub mod fixtures;

use rand::rngs::StdRng;
use rand::SeedableRng;

use drill_core::store::{ReviewStateStore, Versioned};
use drill_core::types::{ItemId, ReviewState, UserId};
use drill_core::Scheduler;
use drill_store::{SettingsRepository, SqliteRepository};

pub const USER: UserId = 1;
pub const OTHER_USER: UserId = 2;

/// Test context holding a seeded in-memory database.
pub struct TestContext {
    pub repo: SqliteRepository,
}

impl TestContext {
    /// Create a new test context with the fixture catalog loaded.
    ///
    /// # Panics
    /// Panics if the database cannot be opened or seeded.
    pub fn new() -> Self {
        let repo = SqliteRepository::open_in_memory().expect("Failed to open test database");
        repo.upsert_items(&fixtures::all_items())
            .expect("Failed to seed catalog");
        Self { repo }
    }

    /// Scheduler over this database using the stored global settings.
    pub fn scheduler(&self) -> Scheduler<&SqliteRepository, &SqliteRepository> {
        let settings = self
            .repo
            .get_effective_settings(None)
            .expect("Failed to load settings");
        Scheduler::new(&self.repo, &self.repo, &settings)
    }

    pub fn state(&self, user_id: UserId, item_id: ItemId) -> Option<Versioned<ReviewState>> {
        self.repo
            .load_state(user_id, item_id)
            .expect("Failed to load review state")
    }
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
