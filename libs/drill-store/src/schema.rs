//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the drill database.
pub const SCHEMA: &str = r#"
-- Practiceable items (read-only to the scheduler)
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY,
    lexeme_id INTEGER NOT NULL,
    category TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('form', 'vocabulary')),
    direction TEXT,
    answer TEXT NOT NULL,
    data TEXT NOT NULL,
    frequency_rank INTEGER
);

-- Per-user review state, versioned for optimistic concurrency
CREATE TABLE IF NOT EXISTS review_states (
    user_id INTEGER NOT NULL,
    item_id INTEGER NOT NULL,
    ease_factor REAL NOT NULL DEFAULT 2.5 CHECK (ease_factor >= 1.3),
    interval_days INTEGER NOT NULL DEFAULT 0,
    repetitions INTEGER NOT NULL DEFAULT 0,
    lapses INTEGER NOT NULL DEFAULT 0,
    due_at TEXT NOT NULL,
    last_reviewed_at TEXT,
    stage TEXT NOT NULL DEFAULT 'new',
    introduced_at TEXT NOT NULL,
    attempts INTEGER NOT NULL DEFAULT 0,
    correct_attempts INTEGER NOT NULL DEFAULT 0,
    streak INTEGER NOT NULL DEFAULT 0,
    archived_at TEXT,
    version INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (user_id, item_id)
);

-- Per-category settings overrides
CREATE TABLE IF NOT EXISTS category_settings (
    category TEXT PRIMARY KEY,
    algorithm TEXT,
    tolerance TEXT,
    similarity_threshold REAL,
    new_items_per_day INTEGER,
    session_size INTEGER,
    choice_count INTEGER,
    mastered_after_days INTEGER
);

-- Global settings
CREATE TABLE IF NOT EXISTS global_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    algorithm TEXT NOT NULL DEFAULT 'sm2',
    tolerance TEXT NOT NULL DEFAULT 'lenient',
    similarity_threshold REAL NOT NULL DEFAULT 0.8,
    new_items_per_day INTEGER NOT NULL DEFAULT 10,
    session_size INTEGER NOT NULL DEFAULT 20,
    daily_reset_hour INTEGER NOT NULL DEFAULT 0,
    choice_count INTEGER NOT NULL DEFAULT 4,
    mastered_after_days INTEGER NOT NULL DEFAULT 90
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_items_lexeme ON items(lexeme_id);
CREATE INDEX IF NOT EXISTS idx_items_category ON items(category);
CREATE INDEX IF NOT EXISTS idx_items_rank ON items(frequency_rank);
CREATE INDEX IF NOT EXISTS idx_review_states_due ON review_states(user_id, due_at);
CREATE INDEX IF NOT EXISTS idx_review_states_introduced ON review_states(user_id, introduced_at);
"#;

/// Initialize global settings if not exists.
pub const INIT_GLOBAL_SETTINGS: &str = r#"
INSERT OR IGNORE INTO global_settings (id) VALUES (1);
"#;

/// Record the schema version if not exists.
pub const INIT_SCHEMA_VERSION: &str = r#"
INSERT OR IGNORE INTO schema_version (version) VALUES (1);
"#;
