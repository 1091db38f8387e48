//! SQLite persistence for the Greek drill library.
//!
//! Implements the review state store and content catalog traits from
//! `drill-core` on top of a single rusqlite connection, together with
//! settings storage.

pub mod error;
pub mod repository;
pub mod schema;

pub use error::DbError;
pub use repository::{SettingsRepository, SqliteRepository};
