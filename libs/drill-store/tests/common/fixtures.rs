//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, TimeZone, Utc};

use drill_core::types::{
    Direction, InflectedForm, Inflection, Item, ItemId, ItemKind, Mood, Number, Person, Tense,
    VocabPair, Voice,
};

/// Lexeme id shared by the γράφω paradigm.
pub const GRAFO: i64 = 100;

/// Present indicative active of γράφω, ids 1-6, ranked by frequency.
pub fn grafo_present() -> Vec<Item> {
    let cells = [
        ("γράφω", Person::First, Number::Singular),
        ("γράφεις", Person::Second, Number::Singular),
        ("γράφει", Person::Third, Number::Singular),
        ("γράφουμε", Person::First, Number::Plural),
        ("γράφετε", Person::Second, Number::Plural),
        ("γράφουν", Person::Third, Number::Plural),
    ];

    cells
        .into_iter()
        .enumerate()
        .map(|(i, (surface, person, number))| Item {
            id: i as ItemId + 1,
            lexeme_id: GRAFO,
            category: "verbs".to_string(),
            kind: ItemKind::Form(InflectedForm {
                surface: surface.to_string(),
                inflection: Inflection::Verb {
                    tense: Tense::Present,
                    mood: Mood::Indicative,
                    voice: Voice::Active,
                    person: Some(person),
                    number: Some(number),
                },
            }),
            frequency_rank: Some(i as u32 + 1),
        })
        .collect()
}

/// Create a vocabulary item in the "home" category.
pub fn vocab(id: ItemId, greek: &str, english: &str, direction: Direction) -> Item {
    Item {
        id,
        lexeme_id: id,
        category: "home".to_string(),
        kind: ItemKind::Vocabulary(VocabPair {
            greek: greek.to_string(),
            english: english.to_string(),
            direction,
        }),
        frequency_rank: None,
    }
}

/// Unranked Greek-to-English vocabulary, ids 20-23.
pub fn home_vocabulary() -> Vec<Item> {
    vec![
        vocab(20, "σπίτι", "house; home", Direction::GreekToEnglish),
        vocab(21, "πόρτα", "door", Direction::GreekToEnglish),
        vocab(22, "παράθυρο", "window", Direction::GreekToEnglish),
        vocab(23, "κουζίνα", "kitchen", Direction::GreekToEnglish),
    ]
}

pub fn all_items() -> Vec<Item> {
    let mut items = grafo_present();
    items.extend(home_vocabulary());
    items
}

/// Fixed clock for tests: 2024-03-01 09:00 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}
