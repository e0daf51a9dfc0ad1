// --- File: src/core/profile.rs
use crate::core::cleaner::{clean_text, tokenize};
use crate::core::ngram::generate_ngrams;
use crate::core::types::{Count, LanguageId, NGram, Rank};
use crate::error::{LangIdError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

// --- FrequencyTable: n-gram counts accumulated over one or more documents ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    counts: HashMap<NGram, Count>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from already-tokenized words.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        table.add_tokens(tokens);
        table
    }

    /// Cleans, tokenizes and counts a raw text. Training and classification
    /// both go through here so their preprocessing can never diverge.
    pub fn add_text(&mut self, raw: &str) -> usize {
        self.add_tokens(tokenize(&clean_text(raw)))
    }

    /// Counts the n-grams of every token. Returns how many tokens were seen.
    pub fn add_tokens<I, S>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = 0;
        for token in tokens {
            self.add_token(token.as_ref());
            seen += 1;
        }
        seen
    }

    /// O(k) in the number of n-grams of the token; allocates only for unseen n-grams.
    pub fn add_token(&mut self, token: &str) {
        for gram in generate_ngrams(token) {
            self.increment(gram, 1);
        }
    }

    /// Merges another table into this one by summing counts.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (gram, &count) in &other.counts {
            self.increment(gram, count);
        }
    }

    fn increment(&mut self, gram: &str, by: Count) {
        if let Some(count) = self.counts.get_mut(gram) {
            *count += by;
        } else {
            self.counts.insert(gram.to_string(), by);
        }
    }

    pub fn count(&self, gram: &str) -> Count {
        self.counts.get(gram).copied().unwrap_or(0)
    }

    /// Number of distinct n-grams.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> Count {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Count)> {
        self.counts.iter().map(|(g, &c)| (g.as_str(), c))
    }

    /// Entries sorted by descending count, then ascending n-gram.
    /// This is the only ordering rule used to rank profiles.
    pub fn sorted_entries(&self) -> Vec<(&str, Count)> {
        let mut entries: Vec<(&str, Count)> = self.iter().collect();
        entries.sort_unstable_by_key(|&(gram, count)| (Reverse(count), gram));
        entries
    }
}

// --- RankedProfile: n-grams in rank order, position + 1 = rank ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedProfile {
    ngrams: Vec<NGram>,
}

impl RankedProfile {
    /// Ranks a table. Deterministic for equal table contents, whatever the
    /// insertion order, since the (count, n-gram) key is a strict total order.
    /// O(n log n) in the number of distinct n-grams.
    pub fn from_table(table: &FrequencyTable) -> Self {
        let ngrams = table
            .sorted_entries()
            .into_iter()
            .map(|(gram, _)| gram.to_string())
            .collect();
        Self { ngrams }
    }

    /// Rebuilds a profile from n-grams already in rank order (e.g. a profile file).
    /// Rejects blank entries, whitespace inside an n-gram and duplicates, any
    /// of which would make the rank assignment ambiguous.
    pub fn from_ranked_ngrams(language: &str, ngrams: Vec<NGram>) -> Result<Self> {
        let malformed = |reason: String| LangIdError::MalformedProfile {
            language: language.to_string(),
            reason,
        };
        if ngrams.is_empty() {
            return Err(malformed("profile is empty".to_string()));
        }
        let mut seen = HashSet::with_capacity(ngrams.len());
        for (i, gram) in ngrams.iter().enumerate() {
            let rank = i + 1;
            if gram.is_empty() {
                return Err(malformed(format!("blank n-gram at rank {}", rank)));
            }
            if gram.chars().any(char::is_whitespace) {
                return Err(malformed(format!("whitespace in n-gram at rank {}", rank)));
            }
            if !seen.insert(gram.as_str()) {
                return Err(malformed(format!("duplicate n-gram {:?} at rank {}", gram, rank)));
            }
        }
        Ok(Self { ngrams })
    }

    /// Keeps only the `limit` best-ranked n-grams. Kept ranks are unchanged.
    pub fn truncated(mut self, limit: usize) -> Self {
        self.ngrams.truncate(limit);
        self
    }

    /// Iterates (rank, n-gram) with 1-based ranks.
    pub fn iter(&self) -> impl Iterator<Item = (Rank, &str)> {
        self.ngrams
            .iter()
            .enumerate()
            .map(|(i, g)| (i as Rank + 1, g.as_str()))
    }

    pub fn ngrams(&self) -> &[NGram] {
        &self.ngrams
    }

    pub fn into_ngrams(self) -> Vec<NGram> {
        self.ngrams
    }

    pub fn len(&self) -> usize {
        self.ngrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ngrams.is_empty()
    }
}

// --- LanguageProfile: a ranked profile bound to a language, pre-indexed for lookup ---

/// Immutable once built. The n-gram -> rank index is computed at construction
/// so classification does one O(1) lookup per test n-gram.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    language: LanguageId,
    profile: RankedProfile,
    ranks: HashMap<NGram, Rank>,
}

impl LanguageProfile {
    pub fn new(language: impl Into<LanguageId>, profile: RankedProfile) -> Self {
        let ranks = profile.iter().map(|(r, g)| (g.to_string(), r)).collect();
        Self {
            language: language.into(),
            profile,
            ranks,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn profile(&self) -> &RankedProfile {
        &self.profile
    }

    pub fn rank_of(&self, gram: &str) -> Option<Rank> {
        self.ranks.get(gram).copied()
    }

    pub fn len(&self) -> usize {
        self.profile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_empty()
    }
}

impl PartialEq for LanguageProfile {
    fn eq(&self, other: &Self) -> bool {
        self.language == other.language && self.profile == other.profile
    }
}

impl Eq for LanguageProfile {}
