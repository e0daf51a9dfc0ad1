use crate::config::DEFAULT_OUT_OF_PROFILE_PENALTY;
use crate::core::profile::{FrequencyTable, LanguageProfile, RankedProfile};
use crate::core::types::{ClassificationResult, LanguageId};
use crate::error::{LangIdError, Result};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Out-of-place distance between a test profile and one reference profile:
/// the sum over test n-grams of |reference rank - test rank|, where an n-gram
/// missing from the reference counts as rank `penalty`.
/// Saturates at `u64::MAX` rather than overflowing on huge penalties.
/// O(T) for T test n-grams.
pub fn distance(test: &RankedProfile, reference: &LanguageProfile, penalty: u64) -> u64 {
    test.iter()
        .map(|(rank, gram)| reference.rank_of(gram).unwrap_or(penalty).abs_diff(rank))
        .fold(0, u64::saturating_add)
}

/// Identifies the language of a text against a fixed set of reference profiles.
///
/// The profile set is built before the classifier and never changes after,
/// so a `Classifier` can be shared across threads (`&Classifier` or `Arc`)
/// and `classify` called concurrently without locking.
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Ordered by language id; iteration order doubles as the tie-break.
    profiles: BTreeMap<LanguageId, LanguageProfile>,
    penalty: u64,
}

impl Classifier {
    pub fn new(profiles: impl IntoIterator<Item = LanguageProfile>) -> Result<Self> {
        Self::with_penalty(profiles, DEFAULT_OUT_OF_PROFILE_PENALTY)
    }

    pub fn with_penalty(
        profiles: impl IntoIterator<Item = LanguageProfile>,
        penalty: u64,
    ) -> Result<Self> {
        let mut by_language = BTreeMap::new();
        for profile in profiles {
            let language = profile.language().to_string();
            if by_language.contains_key(&language) {
                warn!("Duplicate profile for {}; keeping the last one", language);
            }
            by_language.insert(language, profile);
        }
        if by_language.is_empty() {
            return Err(LangIdError::NoProfiles);
        }
        Ok(Self {
            profiles: by_language,
            penalty,
        })
    }

    /// Classifies raw text. Cleaning, tokenization and n-gram extraction are
    /// the same ones used to train the reference profiles.
    pub fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let mut table = FrequencyTable::new();
        table.add_text(text);
        if table.is_empty() {
            return Err(LangIdError::InsufficientInput);
        }
        self.classify_profile(&RankedProfile::from_table(&table))
    }

    /// Classifies an already-ranked test profile.
    /// O(T) per reference language; the minimum distance wins and equal
    /// distances resolve to the lexicographically smallest language id.
    pub fn classify_profile(&self, test: &RankedProfile) -> Result<ClassificationResult> {
        if test.is_empty() {
            return Err(LangIdError::InsufficientInput);
        }

        let mut distances = BTreeMap::new();
        let mut best: Option<(&str, u64)> = None;

        for (language, profile) in &self.profiles {
            let d = distance(test, profile, self.penalty);
            debug!(language = %language, distance = d, "scored profile");
            // strict < keeps the earliest (smallest) id on ties
            if best.map_or(true, |(_, min)| d < min) {
                best = Some((language.as_str(), d));
            }
            distances.insert(language.clone(), d);
        }

        // profiles is non-empty by construction
        let language = best.map(|(l, _)| l.to_string()).ok_or(LangIdError::NoProfiles)?;

        Ok(ClassificationResult {
            language,
            distances,
            test_ngrams: test.len(),
        })
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn profile(&self, language: &str) -> Option<&LanguageProfile> {
        self.profiles.get(language)
    }

    pub fn penalty(&self) -> u64 {
        self.penalty
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(id: &str, ngrams: &[&str]) -> LanguageProfile {
        let ranked = RankedProfile::from_ranked_ngrams(
            id,
            ngrams.iter().map(|g| g.to_string()).collect(),
        )
        .unwrap();
        LanguageProfile::new(id, ranked)
    }

    fn trained(id: &str, text: &str) -> LanguageProfile {
        let mut table = FrequencyTable::new();
        table.add_text(text);
        LanguageProfile::new(id, RankedProfile::from_table(&table))
    }

    #[test]
    fn exact_profile_has_zero_distance() {
        let a = lang("A", &["e", "t", "th"]);
        let b = lang("B", &["q", "x", "xy"]);
        let classifier = Classifier::new(vec![a, b]).unwrap();
        let test = RankedProfile::from_ranked_ngrams("test", vec!["e".into(), "t".into(), "th".into()])
            .unwrap();

        let result = classifier.classify_profile(&test).unwrap();
        assert_eq!(result.language, "A");
        assert_eq!(result.distance_of("A"), Some(0));
        assert_eq!(result.distance_of("B"), Some(49_999 + 49_998 + 49_997));
        assert_eq!(result.test_ngrams, 3);
    }

    #[test]
    fn partial_overlap_distance() {
        let reference = lang("A", &["a", "b", "c"]);
        let test = RankedProfile::from_ranked_ngrams("t", vec!["c".into(), "z".into()]).unwrap();
        // c: |3 - 1| = 2, z: |100 - 2| = 98
        assert_eq!(distance(&test, &reference, 100), 100);
    }

    #[test]
    fn ties_resolve_to_smallest_language_id() {
        let classifier = Classifier::new(vec![
            lang("zz", &["e", "t"]),
            lang("mm", &["e", "t"]),
            lang("aa", &["e", "t"]),
        ])
        .unwrap();
        let result = classifier.classify("ete").unwrap();
        assert_eq!(result.language, "aa");
        assert_eq!(result.distances.len(), 3);
    }

    #[test]
    fn empty_text_is_an_input_error() {
        let classifier = Classifier::new(vec![lang("A", &["a"])]).unwrap();
        for text in ["", "   ", "123 !!! ...", "\n\t"] {
            let err = classifier.classify(text).unwrap_err();
            assert!(err.is_input_error(), "{:?} should be an input error", text);
            assert!(!err.is_configuration_error());
        }
    }

    #[test]
    fn no_profiles_is_a_configuration_error() {
        let err = Classifier::new(Vec::<LanguageProfile>::new()).unwrap_err();
        assert!(matches!(err, LangIdError::NoProfiles));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn result_is_always_a_known_language() {
        let classifier = Classifier::new(vec![
            trained("english", "the quick brown fox jumps over the lazy dog"),
            trained("german", "der schnelle braune fuchs springt über den faulen hund"),
        ])
        .unwrap();
        for text in ["xyzzy", "ü", "qqqq wwww", "the dog", "der hund"] {
            let result = classifier.classify(text).unwrap();
            assert!(classifier.languages().any(|l| l == result.language));
        }
        assert_eq!(classifier.classify("the lazy dog").unwrap().language, "english");
        assert_eq!(classifier.classify("den faulen hund").unwrap().language, "german");
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = Classifier::new(vec![
            trained("a", "abc abd abe"),
            trained("b", "xyz xya xyb"),
        ])
        .unwrap();
        let first = classifier.classify("abx yza").unwrap();
        for _ in 0..5 {
            assert_eq!(classifier.classify("abx yza").unwrap(), first);
        }
    }

    #[test]
    fn concurrent_classification_shares_profiles() {
        let classifier = Classifier::new(vec![
            trained("english", "the cat and the hat and the bat"),
            trained("spanish", "el gato y el sombrero y la casa"),
        ])
        .unwrap();
        let expected = classifier.classify("the hat").unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| classifier.classify("the hat").unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn huge_penalty_saturates_instead_of_overflowing() {
        let classifier =
            Classifier::with_penalty(vec![trained("a", "x"), trained("b", "bc")], u64::MAX).unwrap();
        let result = classifier.classify("bc").unwrap();
        assert_eq!(result.language, "b");
        assert_eq!(result.distance_of("a"), Some(u64::MAX));

        let reference = lang("A", &["a"]);
        let test = RankedProfile::from_ranked_ngrams("t", vec!["y".into(), "z".into()]).unwrap();
        assert_eq!(distance(&test, &reference, u64::MAX), u64::MAX);
    }

    #[test]
    fn penalty_is_configurable() {
        let classifier = Classifier::with_penalty(vec![lang("A", &["a"])], 10).unwrap();
        let result = classifier.classify("b").unwrap();
        // "b" is missing: |10 - 1|
        assert_eq!(result.distance_of("A"), Some(9));
        assert_eq!(classifier.penalty(), 10);
    }
}
