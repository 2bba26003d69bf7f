//! OCR text normalization: cleanup rules, the canonical vocabulary, and the
//! fuzzy normalizer that maps noisy captures onto it.

pub mod cleaner;
pub mod normalizer;
pub mod vocabulary;

pub use cleaner::{CleanRules, Replacement, TextCleaner};
pub use normalizer::{FuzzyNormalizer, Normalized, NormalizerConfig};
pub use vocabulary::VocabularyIndex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    /// Fatal for normalization quality, never for the process: callers fall
    /// back to an empty vocabulary and pass cleaned text through unchanged.
    #[error("vocabulary load failed: {path}: {source}")]
    VocabularyLoadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("replacement rules unreadable: {path}: {source}")]
    RulesIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("replacement rules invalid: {path}: {source}")]
    RulesParse {
        path: String,
        #[source]
        source: json5::Error,
    },
}
