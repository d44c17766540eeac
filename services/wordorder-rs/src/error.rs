//! Error types for the word-order analysis kernel.
//!
//! Malformed corpus records are skipped, never reported. Only precondition
//! violations and I/O failures surface here.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by analysis entry points.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No language collections were supplied.
    #[error("no languages supplied")]
    EmptyCorpus,

    /// An average over aligned sentences was requested but none are comparable.
    #[error("no comparable sentences across {languages} languages")]
    NoComparableSentences { languages: usize },

    /// Matrix dimensions disagree with the language labels.
    #[error("matrix is {rows}x{cols} but {labels} language labels were supplied")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        labels: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
