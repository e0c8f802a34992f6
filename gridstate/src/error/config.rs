//! Configuration loading errors

use std::path::PathBuf;

/// Errors raised while loading a grid definition file.
///
/// Shape anomalies inside `columns` or `data` are not errors: they degrade to
/// empty sequences. Only unreadable or syntactically broken input, and
/// settings that cannot be honoured, end up here.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the expected layout.
    #[error("Invalid grid definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// A page size of zero was requested.
    #[error("Page size must be at least 1 (got {0})")]
    InvalidPageSize(usize),
}
