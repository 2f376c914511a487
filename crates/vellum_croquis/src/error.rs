//! Error types for scanning and resolution.
//!
//! These are contract violations inside the engine. Anything the analyzed
//! source does wrong is a [`vellum_relief::Warning`] instead.

use vellum_carton::CompactString;

/// Error when two descriptors of different members are merged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// Caller paired members that do not share a name.
    #[error("cannot merge `{left}` with `{right}`: names differ")]
    NameMismatch {
        left: CompactString,
        right: CompactString,
    },
}

/// Error type for a single document scan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// A scanner reported a failure from inside a walk.
    #[error("{scanner} scanner failed: {message}")]
    Walk {
        scanner: &'static str,
        message: CompactString,
    },

    /// Merging members of one entity failed.
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// The document set has no source for this URL.
    #[error("no source registered for {0}")]
    MissingSource(CompactString),
}

/// Error type for resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Merging inherited members failed.
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// A feature id points at a document the set does not have.
    #[error("document not found: {0}")]
    MissingDocument(CompactString),

    /// A feature id points past the end of its document's feature list.
    #[error("feature {index} not found in {document}")]
    MissingFeature { document: CompactString, index: usize },

    /// The document exists but could not be scanned.
    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),
}

/// Result type for scanning.
pub type ScanResult<T> = Result<T, ScanError>;

/// Result type for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;
