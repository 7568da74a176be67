//! Lookup source abstractions consumed by the resolvers.

use crate::error::SourceError;
use crate::model::{IntentRecord, ResponseRecord};
use crate::pattern::PatternQuery;
use async_trait::async_trait;

#[async_trait]
/// Read-only document store holding keyword reply records.
///
/// Every lookup returns the first matching record in insertion order, so
/// ties resolve deterministically. `Ok(None)` means nothing matched; `Err`
/// means the backend could not be read.
pub trait DocumentSource: Send + Sync {
    /// Record whose keyword set contains `keyword`.
    async fn find_by_keyword(&self, keyword: &str)
    -> Result<Option<ResponseRecord>, SourceError>;

    /// Record satisfying a literal pattern query.
    async fn find_by_pattern(
        &self,
        query: &PatternQuery,
    ) -> Result<Option<ResponseRecord>, SourceError>;

    /// Record whose keyword set intersects `values`.
    async fn find_by_any(&self, values: &[String]) -> Result<Option<ResponseRecord>, SourceError>;

    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

#[async_trait]
/// Read-only tabular store holding intent rows.
pub trait IntentSource: Send + Sync {
    /// All rows in source order, active or not.
    async fn list_all(&self) -> Result<Vec<IntentRecord>, SourceError>;

    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), SourceError> {
        self.list_all().await.map(|_| ())
    }
}
