// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A contiguous substring of a token, 1 to 5 characters long.
/// `String` ordering is byte-wise UTF-8, which matches codepoint order.
pub type NGram = String;

/// The key a language profile is stored and reported under (e.g. "English").
pub type LanguageId = String;

/// 1-based position in a ranked profile.
pub type Rank = u64;

/// Occurrence count of an n-gram.
pub type Count = u64;

/// Outcome of one classification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The language with the minimum out-of-place distance.
    pub language: LanguageId,
    /// Distance against every reference profile, keyed by language.
    pub distances: BTreeMap<LanguageId, u64>,
    /// Number of distinct n-grams in the test profile.
    pub test_ngrams: usize,
}

impl ClassificationResult {
    /// Languages ordered from closest to farthest, ties by language id.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .distances
            .iter()
            .map(|(lang, &d)| (lang.as_str(), d))
            .collect();
        ranked.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    pub fn distance_of(&self, language: &str) -> Option<u64> {
        self.distances.get(language).copied()
    }
}
