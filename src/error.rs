//! Error types for metadata resolution and file scanning.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while resolving a single property.
///
/// Raised inside the per-property pipeline and caught at the property boundary by the
/// class scanner: the property is left out of the class metadata and the scan continues.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    /// Inline object-literal schemas nested deeper than the supported limit
    #[error("inline object schema nested {depth} levels deep (limit {limit})")]
    DepthExceeded { depth: usize, limit: usize },

    /// Explicit annotations carry both `example` and `examples`
    #[error("explicit annotations declare both `example` and `examples`")]
    ConflictingExamples,

    /// The documentation extractor could not read the property's comment
    #[error("documentation extraction failed: {message}")]
    Documentation { message: String },
}

/// Failure outside the core: reading, parsing, configuring, caching.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid plugin options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("cache error at {}: {message}", path.display())]
    Cache { path: PathBuf, message: String },
}
