use async_trait::async_trait;
use parking_lot::Mutex;
use rules_engine_source::{DocumentSource, PatternQuery, ResponseRecord, SourceError};
use std::sync::Arc;

/// A recorded lookup against [`StubDocumentSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentCall {
    Keyword(String),
    Pattern(PatternQuery),
    Any(Vec<String>),
}

/// In-memory document source that records every lookup.
#[derive(Clone, Default)]
pub struct StubDocumentSource {
    records: Vec<ResponseRecord>,
    calls: Arc<Mutex<Vec<DocumentCall>>>,
    offline: bool,
}

impl StubDocumentSource {
    /// Serve `records` in the given order; ids follow that order.
    pub fn new(records: Vec<ResponseRecord>) -> Self {
        let records = records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| ResponseRecord {
                id: idx as i64 + 1,
                ..record
            })
            .collect();
        Self {
            records,
            ..Self::default()
        }
    }

    /// A source whose every lookup fails as unavailable.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<DocumentCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, call: DocumentCall) -> Result<(), SourceError> {
        self.calls.lock().push(call);
        if self.offline {
            return Err(SourceError::Unavailable("stub source offline".to_string()));
        }
        Ok(())
    }

    fn first(&self, predicate: impl Fn(&ResponseRecord) -> bool) -> Option<ResponseRecord> {
        self.records
            .iter()
            .find(|record| record.has_response() && predicate(record))
            .cloned()
    }
}

#[async_trait]
impl DocumentSource for StubDocumentSource {
    async fn find_by_keyword(
        &self,
        keyword: &str,
    ) -> Result<Option<ResponseRecord>, SourceError> {
        self.record(DocumentCall::Keyword(keyword.to_string()))?;
        Ok(self.first(|record| record.has_keyword(keyword)))
    }

    async fn find_by_pattern(
        &self,
        query: &PatternQuery,
    ) -> Result<Option<ResponseRecord>, SourceError> {
        self.record(DocumentCall::Pattern(query.clone()))?;
        let pattern = query.compile()?;
        Ok(self.first(|record| pattern.matches(record)))
    }

    async fn find_by_any(&self, values: &[String]) -> Result<Option<ResponseRecord>, SourceError> {
        self.record(DocumentCall::Any(values.to_vec()))?;
        Ok(self.first(|record| values.iter().any(|value| record.has_keyword(value))))
    }

    async fn ping(&self) -> Result<(), SourceError> {
        if self.offline {
            return Err(SourceError::Unavailable("stub source offline".to_string()));
        }
        Ok(())
    }
}
