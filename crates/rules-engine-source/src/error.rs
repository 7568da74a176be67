//! Error types for lookup sources and the offline importer.

/// Errors returned when a source cannot be read.
///
/// "Not found" is never an error; sources return `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// SQLite backend error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// HTTP transport or status error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(String),
    /// Service account token could not be minted or exchanged.
    #[error("sheets auth failed: {0}")]
    Auth(String),
    /// Backend could not be reached or misbehaved.
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the offline importer.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Reading the input file failed.
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
    /// The delimited file is malformed.
    #[error("malformed csv at line {line}: {message}")]
    Csv { line: usize, message: String },
    /// A required header column is absent.
    #[error("missing column: {0}")]
    MissingColumn(String),
    /// Writing to the target store failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|position| position.line() as usize)
            .unwrap_or_default();
        ImportError::Csv {
            line,
            message: err.to_string(),
        }
    }
}
