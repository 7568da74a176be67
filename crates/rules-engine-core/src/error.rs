//! Error types for reply resolution.

use rules_engine_source::SourceError;
use thiserror::Error;

/// Errors returned by resolvers.
///
/// Finding nothing is not an error; it resolves to the default reply or to
/// "not found".
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The lookup source could not be read.
    #[error("lookup source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),
}
