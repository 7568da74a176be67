use async_trait::async_trait;
use parking_lot::Mutex;
use rules_engine_source::{IntentRecord, IntentSource, SourceError};
use std::sync::Arc;

/// In-memory intent table that counts reads.
#[derive(Clone, Default)]
pub struct StubIntentSource {
    intents: Vec<IntentRecord>,
    reads: Arc<Mutex<usize>>,
    offline: bool,
}

impl StubIntentSource {
    pub fn new(intents: Vec<IntentRecord>) -> Self {
        Self {
            intents,
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock()
    }
}

#[async_trait]
impl IntentSource for StubIntentSource {
    async fn list_all(&self) -> Result<Vec<IntentRecord>, SourceError> {
        *self.reads.lock() += 1;
        if self.offline {
            return Err(SourceError::Unavailable("stub source offline".to_string()));
        }
        Ok(self.intents.clone())
    }
}
