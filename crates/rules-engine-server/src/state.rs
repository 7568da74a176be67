use rules_engine_config::RepliesConfig;
use rules_engine_core::{IntentResolver, KeywordResolver};
use std::sync::Arc;

/// Shared handler state. Cheap to clone; resolvers are stateless.
#[derive(Clone)]
pub struct AppState {
    pub keywords: Arc<KeywordResolver>,
    pub intents: Arc<IntentResolver>,
    /// Bearer secret for the keyword webhook. `None` rejects every request.
    pub auth_token: Option<Arc<str>>,
    pub replies: Arc<RepliesConfig>,
}

impl AppState {
    pub fn new(
        keywords: KeywordResolver,
        intents: IntentResolver,
        auth_token: Option<String>,
        replies: RepliesConfig,
    ) -> Self {
        Self {
            keywords: Arc::new(keywords),
            intents: Arc::new(intents),
            auth_token: auth_token.map(Arc::from),
            replies: Arc::new(replies),
        }
    }
}
