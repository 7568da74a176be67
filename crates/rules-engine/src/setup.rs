//! Source construction from config.

use crate::error::SetupError;
use log::{info, warn};
use rules_engine_config::{
    DocumentProvider, IntentProvider, IntentsConfig, RulesEngineConfig, SheetsSecret,
};
use rules_engine_core::{IntentResolver, KeywordResolver};
use rules_engine_server::AppState;
use rules_engine_source::{
    DocumentSource, IntentSource, ServiceAccountKey, SheetsCredential, SheetsIntentSource,
    SheetsOptions, SqliteDocumentSource, SqliteIntentSource, SqliteStore,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Opened lookup sources, ready to inject into resolvers.
#[derive(Clone)]
pub struct Sources {
    pub documents: Arc<dyn DocumentSource>,
    pub intents: Arc<dyn IntentSource>,
}

/// Open every source the config names.
///
/// SQLite sources that point at the same file share one connection.
pub fn open_sources(config: &RulesEngineConfig) -> Result<Sources, SetupError> {
    let mut stores: HashMap<PathBuf, SqliteStore> = HashMap::new();
    let mut store_at = |path: &PathBuf| -> Result<SqliteStore, SetupError> {
        if let Some(store) = stores.get(path) {
            return Ok(store.clone());
        }
        let store = SqliteStore::open(path)?;
        stores.insert(path.clone(), store.clone());
        Ok(store)
    };

    let documents: Arc<dyn DocumentSource> = match config.documents.provider {
        DocumentProvider::Sqlite => {
            Arc::new(SqliteDocumentSource::new(store_at(&config.documents.path)?))
        }
    };
    let intents: Arc<dyn IntentSource> = match config.intents.provider {
        IntentProvider::Sqlite => Arc::new(SqliteIntentSource::new(store_at(&config.intents.path)?)),
        IntentProvider::Sheets => Arc::new(SheetsIntentSource::new(sheets_options(&config.intents)?)?),
    };
    info!(
        "sources opened (documents={:?}, intents={:?})",
        config.documents.provider, config.intents.provider
    );
    Ok(Sources { documents, intents })
}

/// Sheets connection options with the credential read from the environment.
pub fn sheets_options(intents: &IntentsConfig) -> Result<SheetsOptions, SetupError> {
    let sheets = &intents.sheets;
    let spreadsheet_id = sheets
        .spreadsheet_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| rules_engine_config::ConfigError::InvalidField {
            path: "intents.sheets.spreadsheet_id".to_string(),
            message: "required when intents.provider is \"sheets\"".to_string(),
        })?;
    let credential = match sheets.resolve_secret() {
        Some(SheetsSecret::AccessToken(token)) => SheetsCredential::AccessToken(token),
        Some(SheetsSecret::ServiceAccount {
            client_email,
            private_key,
        }) => SheetsCredential::ServiceAccount(ServiceAccountKey {
            client_email,
            private_key,
            token_uri: sheets.token_uri.clone(),
        }),
        Some(SheetsSecret::ApiKey(key)) => SheetsCredential::ApiKey(key),
        None => {
            warn!(
                "no sheets credential set; requests are unauthenticated (api_key_env={}, access_token_env={}, service_account_email_env={})",
                sheets.api_key_env, sheets.access_token_env, sheets.service_account_email_env
            );
            SheetsCredential::None
        }
    };
    Ok(SheetsOptions {
        endpoint: sheets.endpoint.clone(),
        spreadsheet_id,
        range: sheets.range.clone(),
        credential,
        timeout: Duration::from_secs(sheets.timeout_secs),
    })
}

/// Server state over opened sources and the config's reply texts.
pub fn build_state(config: &RulesEngineConfig, sources: Sources) -> AppState {
    let auth_token = config.auth.resolve_token();
    if auth_token.is_none() {
        warn!(
            "no webhook secret configured; keyword webhook will reject all requests (token_env={})",
            config.auth.token_env
        );
    }
    AppState::new(
        KeywordResolver::new(sources.documents, config.replies.default_reply.clone()),
        IntentResolver::new(sources.intents),
        auth_token,
        config.replies.clone(),
    )
}
