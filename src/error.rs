//! Error handling utilities shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = CodeswitchError> = std::result::Result<T, E>;

/// Domain-specific error describing failures during configuration, training, or decoding.
#[derive(Debug, Error)]
pub enum CodeswitchError {
    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
    /// A frequency lexicon line could not be parsed. Training aborts on the first bad line.
    #[error("malformed lexicon entry at {path:?} line {line}: {message}")]
    MalformedLexicon {
        /// Source file the entry was read from, if known.
        path: Option<PathBuf>,
        /// 1-indexed line number of the offending entry.
        line: usize,
        /// Description of what was wrong with the entry.
        message: String,
    },
    /// Caller passed input the decoder cannot operate on, e.g. an empty token sequence.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Catch-all variant for invariants that should not occur.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CodeswitchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl CodeswitchError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }
}
