//! Error types for the aggregation pipeline.
//!
//! - [`LoadError`] - reading the source spreadsheet
//! - [`WriteError`] - persisting a grouped table
//! - [`ValidationError`] - completeness check between source and groups
//! - [`PipelineError`] - top-level run errors, tagged with the failing stage
//!
//! Conversions are implemented via `From` so `?` works across stages.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while loading the source table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Path does not resolve to a readable file.
    #[error("Cannot read '{}': {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent from the header row.
    #[error("'{}' has no '{column}' column (found: {})", .path.display(), .found.join(", "))]
    Schema {
        path: PathBuf,
        column: String,
        found: Vec<String>,
    },

    /// The artifact cannot be parsed as tabular data.
    #[error("'{}' is not a readable table: {message}", .path.display())]
    Format { path: PathBuf, message: String },
}

impl LoadError {
    pub(crate) fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LoadError::Format {
            path: path.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Write Errors
// =============================================================================

/// Errors while persisting a grouped table.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Destination could not be created.
    #[error("Cannot create '{}': {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or flushing rows failed.
    #[error("Cannot write '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Flushing the final buffer failed.
    #[error("Cannot flush '{}': {source}", .path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    /// Path of the artifact that could not be written.
    pub fn path(&self) -> &std::path::Path {
        match self {
            WriteError::Create { path, .. }
            | WriteError::Csv { path, .. }
            | WriteError::Flush { path, .. } => path,
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Completeness check failures.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A (key, value) pair count differs between source and grouped view.
    #[error("{view} view: pair ({key:?}, {value:?}) appears {grouped} time(s), source has {source_count}")]
    PairMismatch {
        view: &'static str,
        key: String,
        value: String,
        grouped: usize,
        source_count: usize,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading the source table failed.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// Grouped views do not account for every source pair.
    #[error("{0}")]
    Invariant(#[from] ValidationError),

    /// Writing an output artifact failed.
    #[error("{output} output: {source}")]
    Persist {
        output: &'static str,
        #[source]
        source: WriteError,
    },
}

impl PipelineError {
    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Load(_) => "load",
            PipelineError::Invariant(_) => "transform",
            PipelineError::Persist { .. } => "persist",
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for persist operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
