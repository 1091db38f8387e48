//! Repository pattern for database access.

use crate::error::DbError;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use drill_core::catalog::ContentCatalog;
use drill_core::error::StoreError;
use drill_core::settings::{Algorithm, CategorySettings, EffectiveSettings, GlobalSettings, Tolerance};
use drill_core::store::{ReviewStateStore, SaveOutcome, StoredState, Versioned};
use drill_core::types::{Direction, Item, ItemId, ItemKind, ReviewState, Stage, UserId};
use drill_core::unlock::LEARNED_REPETITIONS;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

type Result<T> = std::result::Result<T, DbError>;

/// Repository for settings operations.
pub trait SettingsRepository {
    fn get_global_settings(&self) -> Result<GlobalSettings>;
    fn save_global_settings(&self, settings: &GlobalSettings) -> Result<()>;
    fn get_category_settings(&self, category: &str) -> Result<Option<CategorySettings>>;
    fn save_category_settings(&self, settings: &CategorySettings) -> Result<()>;
    fn delete_category_settings(&self, category: &str) -> Result<()>;
    fn get_effective_settings(&self, category: Option<&str>) -> Result<EffectiveSettings>;
}

const STATE_COLUMNS: &str = "item_id, ease_factor, interval_days, repetitions, lapses, due_at, \
    last_reviewed_at, stage, introduced_at, attempts, correct_attempts, streak, archived_at, version";

const ITEM_COLUMNS: &str = "id, lexeme_id, category, data, frequency_rank";

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(super::schema::SCHEMA)?;
        self.conn.execute_batch(super::schema::INIT_GLOBAL_SETTINGS)?;
        self.conn.execute_batch(super::schema::INIT_SCHEMA_VERSION)?;
        tracing::debug!(version = super::schema::SCHEMA_VERSION, "initialized drill schema");
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i32> {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .map_err(Into::into)
    }

    /// Insert or replace catalog items. Existing review states are kept.
    pub fn upsert_items(&self, items: &[Item]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO items (id, lexeme_id, category, kind, direction, answer, data, frequency_rank)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for item in items {
                let (kind, direction) = match &item.kind {
                    ItemKind::Form(_) => ("form", None),
                    ItemKind::Vocabulary(pair) => ("vocabulary", Some(direction_str(pair.direction))),
                };
                stmt.execute(params![
                    item.id,
                    item.lexeme_id,
                    item.category,
                    kind,
                    direction,
                    item.expected_answer(),
                    serde_json::to_string(&item.kind)?,
                    item.frequency_rank,
                ])?;
            }
        }
        tx.commit()?;
        Ok(items.len())
    }

    pub fn item_count(&self) -> Result<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
            .map_err(Into::into)
    }

    fn query_states(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<StoredState>> {
        let mut stmt = self.conn.prepare(sql)?;
        let states = stmt
            .query_map(params, Self::row_to_state)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(states)
    }

    fn row_to_state(row: &Row) -> rusqlite::Result<StoredState> {
        let stage_str: String = row.get(7)?;
        let stage = Stage::from_str(&stage_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(7, Type::Text, format!("unknown stage {stage_str:?}").into())
        })?;

        Ok(StoredState {
            item_id: row.get(0)?,
            state: ReviewState {
                ease_factor: row.get(1)?,
                interval_days: row.get(2)?,
                repetitions: row.get(3)?,
                lapses: row.get(4)?,
                due_at: timestamp(row, 5)?,
                last_reviewed_at: optional_timestamp(row, 6)?,
                stage,
                introduced_at: timestamp(row, 8)?,
                attempts: row.get(9)?,
                correct_attempts: row.get(10)?,
                streak: row.get(11)?,
                archived_at: optional_timestamp(row, 12)?,
            },
            version: row.get::<_, i64>(13)? as u64,
        })
    }

    fn row_to_item(row: &Row) -> rusqlite::Result<Item> {
        let data: String = row.get(3)?;
        let kind: ItemKind = serde_json::from_str(&data)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        Ok(Item {
            id: row.get(0)?,
            lexeme_id: row.get(1)?,
            category: row.get(2)?,
            kind,
            frequency_rank: row.get(4)?,
        })
    }

    fn load(&self, user_id: UserId, item_id: ItemId) -> Result<Option<Versioned<ReviewState>>> {
        let sql = format!("SELECT {STATE_COLUMNS} FROM review_states WHERE user_id = ?1 AND item_id = ?2");
        let stored = self
            .conn
            .query_row(&sql, params![user_id, item_id], Self::row_to_state)
            .optional()?;
        Ok(stored.map(|s| Versioned {
            value: s.state,
            version: s.version,
        }))
    }

    fn save(
        &self,
        user_id: UserId,
        item_id: ItemId,
        state: &ReviewState,
        expected_version: Option<u64>,
    ) -> Result<SaveOutcome> {
        let due_at = format_timestamp(&state.due_at)?;
        let last_reviewed_at = state.last_reviewed_at.as_ref().map(format_timestamp).transpose()?;
        let introduced_at = format_timestamp(&state.introduced_at)?;
        let archived_at = state.archived_at.as_ref().map(format_timestamp).transpose()?;

        let (changed, version) = match expected_version {
            None => {
                let changed = self.conn.execute(
                    "INSERT OR IGNORE INTO review_states (user_id, item_id, ease_factor, interval_days, repetitions, lapses, due_at, last_reviewed_at, stage, introduced_at, attempts, correct_attempts, streak, archived_at, version)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 1)",
                    params![
                        user_id,
                        item_id,
                        state.ease_factor,
                        state.interval_days,
                        state.repetitions,
                        state.lapses,
                        due_at,
                        last_reviewed_at,
                        state.stage.as_str(),
                        introduced_at,
                        state.attempts,
                        state.correct_attempts,
                        state.streak,
                        archived_at,
                    ],
                )?;
                (changed, 1)
            }
            Some(expected) => {
                let changed = self.conn.execute(
                    "UPDATE review_states SET ease_factor = ?3, interval_days = ?4, repetitions = ?5, lapses = ?6, due_at = ?7, last_reviewed_at = ?8, stage = ?9, introduced_at = ?10, attempts = ?11, correct_attempts = ?12, streak = ?13, archived_at = ?14, version = version + 1
                     WHERE user_id = ?1 AND item_id = ?2 AND version = ?15",
                    params![
                        user_id,
                        item_id,
                        state.ease_factor,
                        state.interval_days,
                        state.repetitions,
                        state.lapses,
                        due_at,
                        last_reviewed_at,
                        state.stage.as_str(),
                        introduced_at,
                        state.attempts,
                        state.correct_attempts,
                        state.streak,
                        archived_at,
                        expected as i64,
                    ],
                )?;
                (changed, expected + 1)
            }
        };

        if changed == 0 {
            tracing::debug!(user_id, item_id, ?expected_version, "rejected stale review state write");
            return Ok(SaveOutcome::Conflict);
        }
        Ok(SaveOutcome::Saved(version))
    }

    fn candidates(
        &self,
        user_id: UserId,
        exclude: &HashSet<ItemId>,
        max_rank: u32,
        limit: usize,
    ) -> Result<Vec<Item>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE (frequency_rank IS NULL OR frequency_rank <= ?2)
               AND id NOT IN (SELECT item_id FROM review_states WHERE user_id = ?1)
             ORDER BY frequency_rank IS NULL, frequency_rank, id
             LIMIT ?3"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let fetch = limit.saturating_add(exclude.len());
        let items = stmt
            .query_map(params![user_id, max_rank, fetch], Self::row_to_item)?
            .filter(|item| item.as_ref().map_or(true, |item| !exclude.contains(&item.id)))
            .take(limit)
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn siblings(&self, item_id: ItemId) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT o.answer FROM items i
             JOIN items o ON o.id != i.id AND o.kind = i.kind
             WHERE i.id = ?1
               AND ((i.kind = 'form' AND o.lexeme_id = i.lexeme_id)
                 OR (i.kind = 'vocabulary' AND o.category = i.category AND o.direction = i.direction))
             ORDER BY o.id",
        )?;
        let answers = stmt
            .query_map(params![item_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(answers)
    }
}

impl ReviewStateStore for SqliteRepository {
    fn load_state(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> std::result::Result<Option<Versioned<ReviewState>>, StoreError> {
        Ok(self.load(user_id, item_id)?)
    }

    fn save_state(
        &self,
        user_id: UserId,
        item_id: ItemId,
        state: &ReviewState,
        expected_version: Option<u64>,
    ) -> std::result::Result<SaveOutcome, StoreError> {
        Ok(self.save(user_id, item_id, state, expected_version)?)
    }

    fn states_for_user(&self, user_id: UserId) -> std::result::Result<Vec<StoredState>, StoreError> {
        let sql = format!("SELECT {STATE_COLUMNS} FROM review_states WHERE user_id = ?1 ORDER BY item_id");
        Ok(self.query_states(&sql, params![user_id])?)
    }

    fn due_states(
        &self,
        user_id: UserId,
        as_of: DateTime<Utc>,
    ) -> std::result::Result<Vec<StoredState>, StoreError> {
        let sql = format!(
            "SELECT {STATE_COLUMNS} FROM review_states
             WHERE user_id = ?1 AND archived_at IS NULL AND due_at <= ?2
             ORDER BY due_at, ease_factor, item_id"
        );
        let as_of = format_timestamp(&as_of)?;
        Ok(self.query_states(&sql, params![user_id, as_of])?)
    }

    fn known_items(&self, user_id: UserId) -> std::result::Result<HashSet<ItemId>, StoreError> {
        let known = || -> Result<HashSet<ItemId>> {
            let mut stmt = self.conn.prepare("SELECT item_id FROM review_states WHERE user_id = ?1")?;
            let ids = stmt
                .query_map(params![user_id], |row| row.get(0))?
                .collect::<rusqlite::Result<HashSet<ItemId>>>()?;
            Ok(ids)
        };
        Ok(known()?)
    }

    fn introduced_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> std::result::Result<usize, StoreError> {
        let count = || -> Result<usize> {
            let since = format_timestamp(&since)?;
            let count = self.conn.query_row(
                "SELECT COUNT(*) FROM review_states WHERE user_id = ?1 AND introduced_at >= ?2",
                params![user_id, since],
                |row| row.get(0),
            )?;
            Ok(count)
        };
        Ok(count()?)
    }

    fn learned_count(&self, user_id: UserId) -> std::result::Result<usize, StoreError> {
        let count = || -> Result<usize> {
            let count = self.conn.query_row(
                "SELECT COUNT(*) FROM review_states WHERE user_id = ?1 AND repetitions >= ?2",
                params![user_id, LEARNED_REPETITIONS],
                |row| row.get(0),
            )?;
            Ok(count)
        };
        Ok(count()?)
    }
}

impl ContentCatalog for SqliteRepository {
    fn item(&self, item_id: ItemId) -> std::result::Result<Option<Item>, StoreError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");
        let item: Result<Option<Item>> = self
            .conn
            .query_row(&sql, params![item_id], Self::row_to_item)
            .optional()
            .map_err(Into::into);
        Ok(item?)
    }

    fn sibling_forms(&self, item_id: ItemId) -> std::result::Result<Vec<String>, StoreError> {
        Ok(self.siblings(item_id)?)
    }

    fn new_item_candidates(
        &self,
        user_id: UserId,
        exclude: &HashSet<ItemId>,
        max_rank: u32,
        limit: usize,
    ) -> std::result::Result<Vec<Item>, StoreError> {
        Ok(self.candidates(user_id, exclude, max_rank, limit)?)
    }
}

impl SettingsRepository for SqliteRepository {
    fn get_global_settings(&self) -> Result<GlobalSettings> {
        self.conn
            .query_row(
                "SELECT algorithm, tolerance, similarity_threshold, new_items_per_day, session_size, daily_reset_hour, choice_count, mastered_after_days FROM global_settings WHERE id = 1",
                [],
                |row| {
                    let algorithm_str: String = row.get(0)?;
                    let tolerance_str: String = row.get(1)?;

                    Ok(GlobalSettings {
                        algorithm: Algorithm::from_str(&algorithm_str).unwrap_or_default(),
                        tolerance: Tolerance::from_str(&tolerance_str).unwrap_or_default(),
                        similarity_threshold: row.get(2)?,
                        new_items_per_day: row.get(3)?,
                        session_size: row.get(4)?,
                        daily_reset_hour: row.get(5)?,
                        choice_count: row.get(6)?,
                        mastered_after_days: row.get(7)?,
                    })
                },
            )
            .map_err(Into::into)
    }

    fn save_global_settings(&self, settings: &GlobalSettings) -> Result<()> {
        self.conn.execute(
            "UPDATE global_settings SET algorithm = ?1, tolerance = ?2, similarity_threshold = ?3, new_items_per_day = ?4, session_size = ?5, daily_reset_hour = ?6, choice_count = ?7, mastered_after_days = ?8 WHERE id = 1",
            params![
                settings.algorithm.as_str(),
                settings.tolerance.as_str(),
                settings.similarity_threshold,
                settings.new_items_per_day,
                settings.session_size,
                settings.daily_reset_hour,
                settings.choice_count,
                settings.mastered_after_days,
            ],
        )?;

        Ok(())
    }

    fn get_category_settings(&self, category: &str) -> Result<Option<CategorySettings>> {
        self.conn
            .query_row(
                "SELECT category, algorithm, tolerance, similarity_threshold, new_items_per_day, session_size, choice_count, mastered_after_days FROM category_settings WHERE category = ?1",
                params![category],
                |row| {
                    let algorithm_str: Option<String> = row.get(1)?;
                    let tolerance_str: Option<String> = row.get(2)?;

                    Ok(CategorySettings {
                        category: row.get(0)?,
                        algorithm: algorithm_str.and_then(|s| Algorithm::from_str(&s)),
                        tolerance: tolerance_str.and_then(|s| Tolerance::from_str(&s)),
                        similarity_threshold: row.get(3)?,
                        new_items_per_day: row.get(4)?,
                        session_size: row.get(5)?,
                        choice_count: row.get(6)?,
                        mastered_after_days: row.get(7)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    fn save_category_settings(&self, settings: &CategorySettings) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO category_settings (category, algorithm, tolerance, similarity_threshold, new_items_per_day, session_size, choice_count, mastered_after_days) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                settings.category,
                settings.algorithm.map(|a| a.as_str()),
                settings.tolerance.map(|t| t.as_str()),
                settings.similarity_threshold,
                settings.new_items_per_day,
                settings.session_size,
                settings.choice_count,
                settings.mastered_after_days,
            ],
        )?;

        Ok(())
    }

    fn delete_category_settings(&self, category: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM category_settings WHERE category = ?1",
            params![category],
        )?;
        Ok(())
    }

    fn get_effective_settings(&self, category: Option<&str>) -> Result<EffectiveSettings> {
        let global = self.get_global_settings()?;
        let category_settings = match category {
            Some(name) => self.get_category_settings(name)?,
            None => None,
        };
        let effective = EffectiveSettings::merge(&global, category_settings.as_ref());
        effective
            .validate()
            .map_err(|e| DbError::InvalidData(e.to_string()))?;
        Ok(effective)
    }
}

fn direction_str(direction: Direction) -> &'static str {
    match direction {
        Direction::GreekToEnglish => "greek_to_english",
        Direction::EnglishToGreek => "english_to_greek",
    }
}

/// Fixed-width UTC timestamps so that SQL string comparison orders them.
/// Years outside 0000-9999 have no RFC 3339 form and are rejected.
fn format_timestamp(dt: &DateTime<Utc>) -> Result<String> {
    if !(0..=9999).contains(&dt.year()) {
        return Err(DbError::InvalidData(format!("timestamp out of range: {dt}")));
    }
    Ok(dt.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_timestamp(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(_) => timestamp(row, idx).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use drill_core::types::{InflectedForm, Inflection, Mood, Number, Person, Tense, VocabPair, Voice};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn form(id: ItemId, lexeme_id: i64, surface: &str, rank: Option<u32>) -> Item {
        Item {
            id,
            lexeme_id,
            category: "verbs".to_string(),
            kind: ItemKind::Form(InflectedForm {
                surface: surface.to_string(),
                inflection: Inflection::Verb {
                    tense: Tense::Present,
                    mood: Mood::Indicative,
                    voice: Voice::Active,
                    person: Some(Person::First),
                    number: Some(Number::Singular),
                },
            }),
            frequency_rank: rank,
        }
    }

    fn repo() -> SqliteRepository {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.upsert_items(&[
            form(1, 10, "γράφω", Some(2)),
            form(2, 10, "γράφεις", None),
            form(3, 11, "λέω", Some(1)),
        ])
        .unwrap();
        repo
    }

    #[test]
    fn initializes_schema() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        assert_eq!(repo.schema_version().unwrap(), super::super::schema::SCHEMA_VERSION);
        assert_eq!(repo.item_count().unwrap(), 0);
    }

    #[test]
    fn items_round_trip_through_json() {
        let repo = repo();
        let item = repo.item(1).unwrap().unwrap();
        assert_eq!(item, form(1, 10, "γράφω", Some(2)));
        assert!(repo.item(42).unwrap().is_none());
    }

    #[test]
    fn state_round_trip_keeps_every_field() {
        let repo = repo();
        let state = ReviewState {
            ease_factor: 2.36,
            interval_days: 6,
            repetitions: 2,
            lapses: 1,
            due_at: now() + Duration::days(6),
            last_reviewed_at: Some(now()),
            stage: Stage::Review,
            introduced_at: now() - Duration::days(3),
            attempts: 4,
            correct_attempts: 3,
            streak: 2,
            archived_at: None,
        };
        assert_eq!(repo.save_state(7, 1, &state, None).unwrap(), SaveOutcome::Saved(1));

        let loaded = repo.load_state(7, 1).unwrap().unwrap();
        assert_eq!(loaded.value, state);
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn versioned_writes_reject_stale_snapshots() {
        let repo = repo();
        let state = ReviewState::new(2.5, now());
        assert_eq!(repo.save_state(7, 1, &state, None).unwrap(), SaveOutcome::Saved(1));
        assert_eq!(repo.save_state(7, 1, &state, None).unwrap(), SaveOutcome::Conflict);
        assert_eq!(repo.save_state(7, 1, &state, Some(1)).unwrap(), SaveOutcome::Saved(2));
        assert_eq!(repo.save_state(7, 1, &state, Some(1)).unwrap(), SaveOutcome::Conflict);
        assert_eq!(repo.save_state(7, 2, &state, Some(1)).unwrap(), SaveOutcome::Conflict);
    }

    #[test]
    fn out_of_range_timestamps_are_not_stored() {
        let repo = repo();
        let far = Utc.with_ymd_and_hms(12_000, 1, 1, 0, 0, 0).unwrap();
        let state = ReviewState {
            due_at: far,
            ..ReviewState::new(2.5, now())
        };
        assert!(matches!(
            repo.save_state(7, 1, &state, None),
            Err(StoreError::Backend(_))
        ));
        assert!(repo.load_state(7, 1).unwrap().is_none());
        assert!(repo.due_states(7, now()).unwrap().is_empty());
    }

    #[test]
    fn due_states_filter_in_sql() {
        let repo = repo();
        let due = ReviewState::new(2.5, now() - Duration::days(1));
        let later = ReviewState {
            due_at: now() + Duration::minutes(1),
            ..ReviewState::new(2.5, now())
        };
        let archived = ReviewState {
            archived_at: Some(now()),
            ..ReviewState::new(2.5, now() - Duration::days(2))
        };
        repo.save_state(7, 1, &due, None).unwrap();
        repo.save_state(7, 2, &later, None).unwrap();
        repo.save_state(7, 3, &archived, None).unwrap();

        let ids: Vec<ItemId> = repo.due_states(7, now()).unwrap().iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(repo.known_items(7).unwrap(), HashSet::from([1, 2, 3]));
        assert_eq!(repo.introduced_since(7, now() - Duration::hours(1)).unwrap(), 1);
    }

    #[test]
    fn siblings_and_candidates() {
        let repo = repo();
        repo.upsert_items(&[
            Item {
                id: 20,
                lexeme_id: 20,
                category: "home".to_string(),
                kind: ItemKind::Vocabulary(VocabPair {
                    greek: "σπίτι".to_string(),
                    english: "house; home".to_string(),
                    direction: Direction::GreekToEnglish,
                }),
                frequency_rank: None,
            },
            Item {
                id: 21,
                lexeme_id: 21,
                category: "home".to_string(),
                kind: ItemKind::Vocabulary(VocabPair {
                    greek: "πόρτα".to_string(),
                    english: "door".to_string(),
                    direction: Direction::GreekToEnglish,
                }),
                frequency_rank: None,
            },
        ])
        .unwrap();

        assert_eq!(repo.sibling_forms(1).unwrap(), vec!["γράφεις".to_string()]);
        assert_eq!(repo.sibling_forms(20).unwrap(), vec!["door".to_string()]);
        assert!(repo.sibling_forms(3).unwrap().is_empty());

        repo.save_state(7, 3, &ReviewState::new(2.5, now()), None).unwrap();
        let ids: Vec<ItemId> = repo
            .new_item_candidates(7, &HashSet::from([2]), u32::MAX, 10)
            .unwrap()
            .iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, vec![1, 20, 21]);
    }

    #[test]
    fn candidates_stop_at_unlocked_rank() {
        let repo = repo();
        let ids: Vec<ItemId> = repo
            .new_item_candidates(7, &HashSet::new(), 1, 10)
            .unwrap()
            .iter()
            .map(|item| item.id)
            .collect();
        // Rank 2 is locked; the unranked form is not
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn learned_count_in_sql() {
        let repo = repo();
        let learned = ReviewState {
            repetitions: 3,
            ..ReviewState::new(2.5, now())
        };
        let archived = ReviewState {
            archived_at: Some(now()),
            ..learned.clone()
        };
        repo.save_state(7, 1, &learned, None).unwrap();
        repo.save_state(7, 2, &archived, None).unwrap();
        repo.save_state(7, 3, &ReviewState::new(2.5, now()), None).unwrap();
        repo.save_state(8, 1, &learned, None).unwrap();
        assert_eq!(repo.learned_count(7).unwrap(), 2);
        assert_eq!(repo.learned_count(8).unwrap(), 1);
        assert_eq!(repo.learned_count(9).unwrap(), 0);
    }

    #[test]
    fn settings_round_trip() {
        let repo = repo();
        assert_eq!(repo.get_global_settings().unwrap(), GlobalSettings::default());

        let global = GlobalSettings {
            tolerance: Tolerance::Strict,
            new_items_per_day: 5,
            daily_reset_hour: 4,
            ..GlobalSettings::default()
        };
        repo.save_global_settings(&global).unwrap();
        assert_eq!(repo.get_global_settings().unwrap(), global);

        let mut verbs = CategorySettings::new("verbs");
        verbs.algorithm = Some(Algorithm::PassFail);
        verbs.choice_count = Some(3);
        repo.save_category_settings(&verbs).unwrap();
        assert_eq!(repo.get_category_settings("verbs").unwrap(), Some(verbs));

        let effective = repo.get_effective_settings(Some("verbs")).unwrap();
        assert_eq!(effective.algorithm, Algorithm::PassFail);
        assert_eq!(effective.choice_count, 3);
        assert_eq!(effective.tolerance, Tolerance::Strict);
        assert_eq!(effective.daily_reset_hour, 4);

        repo.delete_category_settings("verbs").unwrap();
        assert!(repo.get_category_settings("verbs").unwrap().is_none());
        assert_eq!(repo.get_effective_settings(Some("verbs")).unwrap().algorithm, Algorithm::Sm2);
    }

    #[test]
    fn invalid_stored_settings_are_rejected() {
        let repo = repo();
        let mut broken = CategorySettings::new("verbs");
        broken.similarity_threshold = Some(1.5);
        repo.save_category_settings(&broken).unwrap();
        assert!(matches!(
            repo.get_effective_settings(Some("verbs")),
            Err(DbError::InvalidData(_))
        ));
    }
}
