//! Error types for the mapping engine.
//!
//! Only configuration problems are errors. Unresolved fields, stale catalog
//! references and OCR divergence are reported as data in the
//! [`MappingReport`](ivr_model::MappingReport).

use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems, raised while loading the alias corpus or the
/// match policy.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// A variant appears twice within one scope.
    #[error("Duplicate alias '{variant}' in scope '{scope}': already maps to '{existing}', cannot also map to '{attempted}'")]
    DuplicateAlias {
        scope: String,
        variant: String,
        existing: String,
        attempted: String,
    },

    /// An alias row without a canonical name.
    #[error("Empty canonical name for variant '{variant}' in scope '{scope}'")]
    EmptyCanonicalName { scope: String, variant: String },

    /// An alias row without a variant.
    #[error("Empty variant for canonical name '{canonical}' in scope '{scope}'")]
    EmptyVariant { scope: String, canonical: String },

    /// A policy threshold outside its allowed range.
    #[error("Invalid {name} value {value}: expected a number between 0.0 and 1.0")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// Failed to parse an alias CSV file.
    #[error("Failed to parse alias file {file}: {message}")]
    CsvParse { file: String, message: String },

    /// Failed to read a configuration file or directory.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a match policy document.
    #[error("Invalid match policy: {message}")]
    PolicyParse { message: String },

    /// The shared corpus lock was poisoned by a panicking writer.
    #[error("Alias corpus is unavailable: a writer panicked while holding the lock")]
    CorpusUnavailable,
}

impl ConfigurationError {
    /// Scope the error refers to, if any.
    pub fn scope(&self) -> Option<&str> {
        match self {
            Self::DuplicateAlias { scope, .. }
            | Self::EmptyCanonicalName { scope, .. }
            | Self::EmptyVariant { scope, .. } => Some(scope),
            _ => None,
        }
    }
}

/// Result type for engine configuration operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
