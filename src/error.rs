//! Error types for the pass log pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a pipeline run.
///
/// Per-line parse misses, sidecar misses and per-row geometry failures are not
/// errors; they surface as nulls or the `"Unknown"` sentinel in the output rows.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input directory does not exist
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Orbital-element catalog could not be downloaded
    #[error("Catalog fetch failed: {0}")]
    Fetch(String),

    /// Orbital-element catalog could not be parsed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Output format error (e.g., Parquet write error)
    #[error("Output error: {0}")]
    OutputError(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Process exit code reported by the binary for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::MissingInput(_) => 2,
            Error::Io(_) => 3,
            Error::Fetch(_) => 4,
            Error::Catalog(_) => 5,
            Error::OutputError(_) => 6,
            Error::Other(_) => 1,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}
