// src/lib.rs

pub mod config;
pub mod core;
pub mod corpus;
pub mod error;
pub mod learning;
pub mod persistence;

pub use crate::config::{Config, DEFAULT_OUT_OF_PROFILE_PENALTY};
pub use crate::core::classifier::{distance, Classifier};
pub use crate::core::cleaner::{clean_text, tokenize};
pub use crate::core::ngram::{generate_ngrams, MAX_NGRAM_LEN};
pub use crate::core::profile::{FrequencyTable, LanguageProfile, RankedProfile};
pub use crate::core::types::{ClassificationResult, LanguageId, NGram, Rank};
pub use crate::error::{LangIdError, Result};
pub use crate::learning::{AcquisitionFailure, ProfileTrainer, TrainingReport};
