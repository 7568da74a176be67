//! Intent lookup against the tabular CMS.

use crate::error::ResolveError;
use crate::policy::{MatchStrategy, ResolutionPolicy};
use async_trait::async_trait;
use log::{debug, info};
use rules_engine_source::{IntentRecord, IntentSource, SourceError, normalize};
use std::sync::Arc;

/// Active intent whose name (case-insensitive) or numeric id equals the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentNameOrId;

#[async_trait]
impl MatchStrategy<dyn IntentSource, IntentRecord> for IntentNameOrId {
    fn name(&self) -> &'static str {
        "intent_name_or_id"
    }

    async fn find(
        &self,
        input: &str,
        source: &(dyn IntentSource + 'static),
    ) -> Result<Option<IntentRecord>, SourceError> {
        let intents = source.list_all().await?;
        for intent in intents {
            let hit = normalize(&intent.intent_name) == input || intent.intent_id.to_string() == input;
            if !hit {
                continue;
            }
            if !intent.active {
                debug!("skipping inactive intent (intent_id={})", intent.intent_id);
                continue;
            }
            return Ok(Some(intent));
        }
        Ok(None)
    }
}

/// Resolves intent names or ids to intent rows.
///
/// Unlike keyword resolution there is no default reply: a miss is reported
/// as `None` and callers choose their own not-found response.
pub struct IntentResolver {
    source: Arc<dyn IntentSource>,
    policy: ResolutionPolicy<dyn IntentSource, IntentRecord>,
}

impl IntentResolver {
    pub fn new(source: Arc<dyn IntentSource>) -> Self {
        Self {
            source,
            policy: ResolutionPolicy::new().with_strategy(IntentNameOrId),
        }
    }

    pub async fn resolve(&self, intent: &str) -> Result<Option<IntentRecord>, ResolveError> {
        let key = normalize(intent);
        if key.is_empty() {
            return Ok(None);
        }
        let found = self
            .policy
            .first_match(&key, self.source.as_ref())
            .await?
            .map(|(record, _)| record);
        info!(
            "intent resolution (intent={}, found={})",
            key,
            found.is_some()
        );
        Ok(found)
    }
}
