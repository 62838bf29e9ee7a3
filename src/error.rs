use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// The dataset could not be turned into a [`Table`](crate::data::model::Table).
///
/// Fatal for the render pass that triggered the load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("could not decode {}: {reason:#}", .path.display())]
    Decode { path: PathBuf, reason: anyhow::Error },
}

/// A computation referred to a column the table does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column not found: {0}")]
pub struct ColumnNotFoundError(pub String);

/// Structural invariants of a table were violated while building it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("column {column} has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Anything that aborts a dashboard render pass.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    ColumnNotFound(#[from] ColumnNotFoundError),
}
