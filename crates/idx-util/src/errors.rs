use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all indexer operations.
///
/// `PerArtifactError` (spec §7) is deliberately not a variant here: it is
/// recoverable and accumulated on `ArtifactContext::errors` rather than
/// surfaced through `Result`.
#[derive(Debug, Error, Diagnostic)]
pub enum IndexerError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Target directory unusable, or a required input is missing.
    #[error("Invalid argument: {message}")]
    #[diagnostic(help("Check the repository, index, and target directory paths"))]
    InvalidArgument { message: String },

    /// Disk or OS error mid-write; partial outputs were cleaned up.
    #[error("I/O failure during publication: {message}")]
    IoFailure { message: String },

    /// The indexing context could not be loaded; forces full regeneration.
    #[error("Index corruption: {message}")]
    IndexCorruption { message: String },

    /// Another writer already holds the index directory's exclusive lock.
    #[error("Lock obtain failed: {message}")]
    LockObtainFailed { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type IndexerResult<T> = miette::Result<T>;
