// File: src/learning.rs
use crate::config::Config;
use crate::core::profile::{FrequencyTable, LanguageProfile, RankedProfile};
use crate::core::types::LanguageId;
use crate::corpus::Corpus;
use crate::error::{LangIdError, Result};
use std::fmt::Display;
use tracing::{info, warn};

/// A training document that could not be used. Not fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionFailure {
    pub language: LanguageId,
    pub document: String,
    pub reason: String,
}

/// Everything produced while building one language's profile.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub profile: LanguageProfile,
    /// The full counts, before any truncation of the ranked profile.
    pub table: FrequencyTable,
    pub documents_used: usize,
    pub tokens: usize,
    pub failures: Vec<AcquisitionFailure>,
}

/// Builds reference profiles offline from raw documents.
pub struct ProfileTrainer {
    profile_limit: Option<usize>,
}

impl ProfileTrainer {
    pub fn new(config: &Config) -> Self {
        Self {
            profile_limit: config.profile_limit,
        }
    }

    /// Accumulates every readable document into one frequency table and ranks it.
    ///
    /// Documents are consumed one at a time, so a corpus never needs to be in
    /// memory at once. A failed document is logged and skipped; if none can be
    /// used the language fails with `NoUsableDocuments`.
    pub fn train_language<I, E>(&self, language: &str, documents: I) -> Result<TrainingReport>
    where
        I: IntoIterator<Item = (String, std::result::Result<String, E>)>,
        E: Display,
    {
        let mut table = FrequencyTable::new();
        let mut failures = Vec::new();
        let mut documents_used = 0;
        let mut tokens = 0;

        for (name, document) in documents {
            match document {
                Ok(text) => {
                    tokens += table.add_text(&text);
                    documents_used += 1;
                }
                Err(e) => {
                    warn!("Skipping document {} for {}: {}", name, language, e);
                    failures.push(AcquisitionFailure {
                        language: language.to_string(),
                        document: name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if documents_used == 0 || table.is_empty() {
            return Err(LangIdError::NoUsableDocuments {
                language: language.to_string(),
                failed: failures.len(),
            });
        }

        let mut ranked = RankedProfile::from_table(&table);
        if let Some(limit) = self.profile_limit {
            ranked = ranked.truncated(limit);
        }

        info!(
            "Built profile for {}: {} n-grams ranked from {} documents ({} tokens, {} skipped)",
            language,
            ranked.len(),
            documents_used,
            tokens,
            failures.len()
        );

        Ok(TrainingReport {
            profile: LanguageProfile::new(language, ranked),
            table,
            documents_used,
            tokens,
            failures,
        })
    }

    /// Trains every language in the corpus independently, in language-id order.
    /// A language with no usable documents fails on its own; the others still train.
    pub fn train_each(&self, corpus: &Corpus) -> Vec<(LanguageId, Result<TrainingReport>)> {
        corpus
            .languages()
            .map(|language| {
                let report = self.train_language(language, corpus.documents(language));
                (language.to_string(), report)
            })
            .collect()
    }

    /// All-or-nothing training: every language must produce a profile, so a
    /// caller never publishes a set that silently lacks one. Use
    /// [`train_each`](Self::train_each) to keep the languages that succeeded.
    pub fn train_corpus(&self, corpus: &Corpus) -> Result<Vec<TrainingReport>> {
        if corpus.languages().next().is_none() {
            return Err(LangIdError::NoProfiles);
        }
        self.train_each(corpus)
            .into_iter()
            .map(|(_, report)| report)
            .collect()
    }
}

impl Default for ProfileTrainer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
