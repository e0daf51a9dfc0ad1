// src/core/mod.rs

pub mod classifier;
pub mod cleaner;
pub mod ngram;
pub mod profile;
pub mod types;
