//! Free-text keyword resolution.

use crate::error::ResolveError;
use crate::policy::{MatchStrategy, Resolution, ResolutionPolicy};
use async_trait::async_trait;
use log::{debug, info};
use rules_engine_source::{
    DocumentSource, PatternMode, PatternQuery, ResponseRecord, SourceError, normalize,
};
use std::sync::Arc;

/// Input equals one of a record's keywords.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactKeyword;

#[async_trait]
impl MatchStrategy<dyn DocumentSource, ResponseRecord> for ExactKeyword {
    fn name(&self) -> &'static str {
        "exact_keyword"
    }

    async fn find(
        &self,
        input: &str,
        source: &(dyn DocumentSource + 'static),
    ) -> Result<Option<ResponseRecord>, SourceError> {
        let found = source.find_by_keyword(input).await?;
        Ok(found.filter(ResponseRecord::has_response))
    }
}

/// Input is a literal, case-insensitive substring of a record's message,
/// or a member of its keywords.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatch;

#[async_trait]
impl MatchStrategy<dyn DocumentSource, ResponseRecord> for PatternMatch {
    fn name(&self) -> &'static str {
        "pattern"
    }

    async fn find(
        &self,
        input: &str,
        source: &(dyn DocumentSource + 'static),
    ) -> Result<Option<ResponseRecord>, SourceError> {
        let query = PatternQuery::new(input, PatternMode::MessageSubstringOrKeyword);
        let found = source.find_by_pattern(&query).await?;
        Ok(found.filter(ResponseRecord::has_response))
    }
}

/// Any whitespace-separated token of the input is a record keyword.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenMatch;

#[async_trait]
impl MatchStrategy<dyn DocumentSource, ResponseRecord> for TokenMatch {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn find(
        &self,
        input: &str,
        source: &(dyn DocumentSource + 'static),
    ) -> Result<Option<ResponseRecord>, SourceError> {
        let tokens = tokenize(input);
        if tokens.is_empty() {
            return Ok(None);
        }
        let found = source.find_by_any(&tokens).await?;
        Ok(found.filter(ResponseRecord::has_response))
    }
}

/// Distinct whitespace-separated tokens in first-seen order.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in input.split_whitespace() {
        if !tokens.iter().any(|seen| seen == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Exact keyword, then pattern, then token match.
pub fn keyword_policy() -> ResolutionPolicy<dyn DocumentSource, ResponseRecord> {
    ResolutionPolicy::new()
        .with_strategy(ExactKeyword)
        .with_strategy(PatternMatch)
        .with_strategy(TokenMatch)
}

/// Resolves free-text messages to canned replies.
pub struct KeywordResolver {
    source: Arc<dyn DocumentSource>,
    policy: ResolutionPolicy<dyn DocumentSource, ResponseRecord>,
    default_reply: String,
}

impl KeywordResolver {
    pub fn new(source: Arc<dyn DocumentSource>, default_reply: impl Into<String>) -> Self {
        Self {
            source,
            policy: keyword_policy(),
            default_reply: default_reply.into(),
        }
    }

    pub fn default_reply(&self) -> &str {
        &self.default_reply
    }

    /// Resolve a raw user message.
    ///
    /// Messages that are empty after normalization return the default
    /// without any source lookup.
    pub async fn resolve(&self, message: &str) -> Result<Resolution<ResponseRecord>, ResolveError> {
        let text = normalize(message);
        if text.is_empty() {
            debug!("empty message; using default reply");
            return Ok(Resolution::fallback(self.default_reply.as_str()));
        }
        let resolution = self
            .policy
            .resolve(&text, self.source.as_ref(), &self.default_reply)
            .await?;
        info!(
            "keyword resolution (strategy={}, record_id={}, default={})",
            resolution.strategy.unwrap_or("none"),
            resolution
                .matched
                .as_ref()
                .map_or_else(|| "none".to_string(), |record| record.id.to_string()),
            resolution.is_default
        );
        Ok(resolution)
    }
}
