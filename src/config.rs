//! Explicit configuration for training and classification.
//!
//! Loaded from a TOML file (every key optional) and then overridden by CLI
//! flags. The value is passed into the trainer and classifier; nothing reads
//! paths or constants from process-wide state.

use crate::error::{LangIdError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Rank assigned to a test n-gram that a language profile has never seen.
pub const DEFAULT_OUT_OF_PROFILE_PENALTY: u64 = 50_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// One subdirectory of documents per language.
    pub corpus_root: PathBuf,
    /// Where `<language>.ngrams.txt` profiles are written and read.
    pub profile_root: PathBuf,
    pub out_of_profile_penalty: u64,
    /// Keep only this many top-ranked n-grams per language. `None` keeps all.
    pub profile_limit: Option<usize>,
    /// Strip Project Gutenberg header/footer from corpus documents.
    pub strip_boilerplate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_root: PathBuf::from("corpus"),
            profile_root: PathBuf::from("profiles"),
            out_of_profile_penalty: DEFAULT_OUT_OF_PROFILE_PENALTY,
            profile_limit: None,
            strip_boilerplate: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LangIdError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn from_file_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
