//! Reply resolution for the rules engine.
//!
//! This crate owns the ordered match-strategy engine and the two concrete
//! resolvers built on it: free-text keyword replies and intent lookups.

pub mod error;
pub mod intent;
pub mod keyword;
pub mod policy;

/// Resolution failure type.
pub use error::ResolveError;
/// Intent pipeline.
pub use intent::{IntentNameOrId, IntentResolver};
/// Keyword pipeline.
pub use keyword::{ExactKeyword, KeywordResolver, PatternMatch, TokenMatch, keyword_policy};
/// Strategy engine.
pub use policy::{MatchStrategy, Reply, Resolution, ResolutionPolicy};
/// Input normalization shared by both pipelines.
pub use rules_engine_source::normalize;
