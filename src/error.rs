// File: src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by training, persistence and classification.
#[derive(Error, Debug)]
pub enum LangIdError {
    /// The test text produced no tokens, so there is nothing to compare.
    #[error("no usable input text: the text contains no words")]
    InsufficientInput,

    #[error("no trained language profiles available")]
    NoProfiles,

    #[error("malformed profile for '{language}': {reason}")]
    MalformedProfile { language: String, reason: String },

    /// Every document for a language failed to load or yielded no n-grams.
    #[error("no usable training documents for '{language}' ({failed} failed)")]
    NoUsableDocuments { language: String, failed: usize },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("profile bundle error: {0}")]
    Bundle(#[from] bincode::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl LangIdError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LangIdError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the failure is about missing or broken trained profiles
    /// rather than about the text being classified.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LangIdError::NoProfiles
                | LangIdError::MalformedProfile { .. }
                | LangIdError::NoUsableDocuments { .. }
                | LangIdError::Bundle(_)
                | LangIdError::Config(_)
        )
    }

    pub fn is_input_error(&self) -> bool {
        matches!(self, LangIdError::InsufficientInput)
    }
}

pub type Result<T> = std::result::Result<T, LangIdError>;
