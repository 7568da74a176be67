//! Ordered match-strategy engine.

use crate::error::ResolveError;
use async_trait::async_trait;
use log::debug;
use rules_engine_source::{IntentRecord, ResponseRecord, SourceError};

/// Records that carry reply text.
pub trait Reply {
    fn reply_text(&self) -> &str;
}

impl Reply for ResponseRecord {
    fn reply_text(&self) -> &str {
        &self.response
    }
}

impl Reply for IntentRecord {
    fn reply_text(&self) -> &str {
        &self.response_text
    }
}

#[async_trait]
/// One matching rule evaluated against a lookup source.
pub trait MatchStrategy<S: ?Sized + Sync, R: Send>: Send + Sync {
    /// Stable name used in logs and results.
    fn name(&self) -> &'static str;

    /// Look for a match for a normalized input.
    async fn find(&self, input: &str, source: &S) -> Result<Option<R>, SourceError>;
}

/// Outcome of a single resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<R> {
    /// Record that produced the reply, if any strategy matched.
    pub matched: Option<R>,
    /// Reply text handed back to the caller.
    pub response_text: String,
    /// True when no strategy matched and the default was used.
    pub is_default: bool,
    /// Name of the strategy that matched.
    pub strategy: Option<&'static str>,
}

impl<R> Resolution<R> {
    /// Result carrying the default reply.
    pub fn fallback(default_reply: impl Into<String>) -> Self {
        Self {
            matched: None,
            response_text: default_reply.into(),
            is_default: true,
            strategy: None,
        }
    }
}

/// Strategies tried in order until one yields a record.
pub struct ResolutionPolicy<S: ?Sized + Sync, R: Send> {
    strategies: Vec<Box<dyn MatchStrategy<S, R>>>,
}

impl<S: ?Sized + Sync, R: Reply + Send> Default for ResolutionPolicy<S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized + Sync, R: Reply + Send> ResolutionPolicy<S, R> {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Append a strategy with the lowest priority so far.
    pub fn with_strategy(mut self, strategy: impl MatchStrategy<S, R> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Strategy names in priority order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    /// First record any strategy yields, with the strategy's name.
    ///
    /// Source failures abort the ladder immediately.
    pub async fn first_match(
        &self,
        input: &str,
        source: &S,
    ) -> Result<Option<(R, &'static str)>, ResolveError> {
        for strategy in &self.strategies {
            if let Some(record) = strategy.find(input, source).await? {
                debug!("strategy matched (strategy={})", strategy.name());
                return Ok(Some((record, strategy.name())));
            }
            debug!("strategy found nothing (strategy={})", strategy.name());
        }
        Ok(None)
    }

    /// Run the ladder, falling back to `default_reply`.
    ///
    /// Empty input resolves to the default without touching the source.
    pub async fn resolve(
        &self,
        input: &str,
        source: &S,
        default_reply: &str,
    ) -> Result<Resolution<R>, ResolveError> {
        if input.is_empty() {
            return Ok(Resolution::fallback(default_reply));
        }
        match self.first_match(input, source).await? {
            Some((record, strategy)) => Ok(Resolution {
                response_text: record.reply_text().to_string(),
                matched: Some(record),
                is_default: false,
                strategy: Some(strategy),
            }),
            None => Ok(Resolution::fallback(default_reply)),
        }
    }
}
