//! Multiple-choice option generation.

use crate::greek::{is_greek_text, normalize};
use crate::settings::{MAX_CHOICES, MIN_CHOICES};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Options for one multiple-choice question, correct answer included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistractorSet {
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl DistractorSet {
    pub fn correct(&self) -> &str {
        &self.options[self.correct_index]
    }

    /// Number of wrong options actually found.
    pub fn distractor_count(&self) -> usize {
        self.options.len().saturating_sub(1)
    }
}

/// Pick `count - 1` wrong options from `siblings` and shuffle them with the
/// correct form.
///
/// Candidates that normalize to the correct form, to nothing, or to an
/// already chosen candidate are dropped, as are candidates written in the
/// other script. For translation answers, a candidate that contains (or is
/// contained in) another option is dropped as too easy to spot. Fewer
/// siblings than requested yield a smaller set.
pub fn pick_distractors<R, S>(correct: &str, siblings: &[S], count: usize, rng: &mut R) -> DistractorSet
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    let needed = count.clamp(MIN_CHOICES, MAX_CHOICES) - 1;
    let correct = correct.trim();
    let correct_key = normalize(correct);
    let greek_answer = is_greek_text(correct);

    let mut seen: HashSet<String> = HashSet::from([correct_key.clone()]);
    let mut pool: Vec<(String, String)> = Vec::new();
    for sibling in siblings {
        let surface = sibling.as_ref().trim();
        let key = normalize(surface);
        if key.is_empty() || is_greek_text(surface) != greek_answer {
            continue;
        }
        if seen.insert(key.clone()) {
            pool.push((surface.to_string(), key));
        }
    }
    pool.shuffle(rng);

    let mut chosen_keys = vec![correct_key];
    let mut options = vec![correct.to_string()];
    for (surface, key) in pool {
        if options.len() > needed {
            break;
        }
        if !greek_answer && chosen_keys.iter().any(|k| overlaps(k, &key)) {
            continue;
        }
        chosen_keys.push(key);
        options.push(surface);
    }

    options.shuffle(rng);
    let correct_index = options.iter().position(|o| o == correct).unwrap_or(0);

    tracing::trace!(
        correct,
        requested = needed,
        found = options.len() - 1,
        "picked distractors"
    );

    DistractorSet {
        options,
        correct_index,
    }
}

fn overlaps(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FORMS: &[&str] = &["γράφω", "γράφεις", "γράφει", "γράφουμε", "γράφετε", "γράφουν"];

    #[test]
    fn never_includes_correct_twice() {
        let siblings = ["γραφω", "ΓΡΆΦΩ", "γράφεις", "γράφει", "γράφουμε"];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let set = pick_distractors("γράφω", &siblings, 4, &mut rng);
            assert_eq!(set.options.len(), 4);
            assert_eq!(set.correct(), "γράφω");

            let keys: HashSet<String> = set.options.iter().map(|o| normalize(o)).collect();
            assert_eq!(keys.len(), set.options.len());
        }
    }

    #[test]
    fn deduplicates_after_normalization() {
        let siblings = ["γράφεις", "γραφεις", "ΓΡΆΦΕΙΣ"];
        let mut rng = StdRng::seed_from_u64(7);
        let set = pick_distractors("γράφω", &siblings, 4, &mut rng);
        assert_eq!(set.distractor_count(), 1);
    }

    #[test]
    fn returns_short_set_without_siblings() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = pick_distractors::<_, &str>("γράφω", &[], 4, &mut rng);
        assert_eq!(set.options, vec!["γράφω".to_string()]);
        assert_eq!(set.correct_index, 0);
    }

    #[test]
    fn same_seed_same_order() {
        let a = pick_distractors("γράφω", FORMS, 4, &mut StdRng::seed_from_u64(42));
        let b = pick_distractors("γράφω", FORMS, 4, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn correct_position_varies() {
        let positions: HashSet<usize> = (0..40)
            .map(|seed| pick_distractors("γράφω", FORMS, 4, &mut StdRng::seed_from_u64(seed)).correct_index)
            .collect();
        assert!(positions.len() > 1);
    }

    #[test]
    fn count_is_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(pick_distractors("γράφω", FORMS, 0, &mut rng).options.len(), 2);
        assert_eq!(pick_distractors("γράφω", FORMS, 99, &mut rng).options.len(), 6);
    }

    #[test]
    fn drops_other_script() {
        let siblings = ["grafeis", "γράφεις"];
        let mut rng = StdRng::seed_from_u64(5);
        let set = pick_distractors("γράφω", &siblings, 4, &mut rng);
        assert!(!set.options.contains(&"grafeis".to_string()));
        assert_eq!(set.distractor_count(), 1);
    }

    #[test]
    fn translation_options_do_not_contain_each_other() {
        let siblings = ["big house", "door", "window"];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let set = pick_distractors("house", &siblings, 4, &mut rng);
            assert!(!set.options.contains(&"big house".to_string()));
            assert_eq!(set.options.len(), 3);
        }
    }
}
