//! Configuration schema for the rules engine.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root config for the rules engine service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RulesEngineConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub replies: RepliesConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub intents: IntentsConfig,
}

impl RulesEngineConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> RulesEngineConfigBuilder {
        RulesEngineConfigBuilder::new()
    }
}

/// Builder for assembling a `RulesEngineConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct RulesEngineConfigBuilder {
    config: RulesEngineConfig,
}

impl RulesEngineConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: RulesEngineConfig::default(),
        }
    }

    /// Replace the HTTP server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the webhook auth configuration.
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.config.auth = auth;
        self
    }

    /// Replace the reply texts.
    pub fn replies(mut self, replies: RepliesConfig) -> Self {
        self.config.replies = replies;
        self
    }

    /// Replace the document source configuration.
    pub fn documents(mut self, documents: DocumentsConfig) -> Self {
        self.config.documents = documents;
        self
    }

    /// Replace the intent source configuration.
    pub fn intents(mut self, intents: IntentsConfig) -> Self {
        self.config.intents = intents;
        self
    }

    /// Finalize and validate the config.
    pub fn build(self) -> Result<RulesEngineConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

/// Shared-secret bearer auth for the keyword webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Inline token; takes precedence over `token_env`.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: default_token_env(),
        }
    }
}

impl AuthConfig {
    /// The configured secret, or `None` when neither source provides one.
    ///
    /// An unset secret rejects every keyword webhook request.
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(&self.token_env).ok())
            .filter(|token| !token.is_empty())
    }
}

fn default_token_env() -> String {
    "MANYCHAT_INTEGRATION_TOKEN".to_string()
}

/// Texts returned to chat users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepliesConfig {
    /// Keyword pipeline reply when nothing matches.
    #[serde(default = "default_reply")]
    pub default_reply: String,
    /// Dialogflow reply when the request names no intent.
    #[serde(default = "default_intent_fallback")]
    pub intent_fallback: String,
    /// Dialogflow reply when the intent is not in the table.
    #[serde(default = "default_intent_not_found")]
    pub intent_not_found: String,
    /// Dialogflow reply for a matched intent with empty response text.
    #[serde(default = "default_intent_unconfigured")]
    pub intent_unconfigured: String,
    /// Dialogflow reply when the intent source fails.
    #[serde(default = "default_webhook_error")]
    pub webhook_error: String,
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            default_reply: default_reply(),
            intent_fallback: default_intent_fallback(),
            intent_not_found: default_intent_not_found(),
            intent_unconfigured: default_intent_unconfigured(),
            webhook_error: default_webhook_error(),
        }
    }
}

fn default_reply() -> String {
    "Gracias — en breve le respondemos.".to_string()
}

fn default_intent_fallback() -> String {
    "Lo siento, no entendí su solicitud. ¿Desea que le conecte con un agente humano?".to_string()
}

fn default_intent_not_found() -> String {
    "Lo siento, no tengo una respuesta configurada. ¿Desea hablar con un agente?".to_string()
}

fn default_intent_unconfigured() -> String {
    "Respuesta no configurada".to_string()
}

fn default_webhook_error() -> String {
    "Error interno en el webhook.".to_string()
}

/// Backends available for response documents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentProvider {
    #[default]
    Sqlite,
}

/// Where keyword response records live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default)]
    pub provider: DocumentProvider,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            provider: DocumentProvider::default(),
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("rules-engine.db")
}

/// Backends available for the intent table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntentProvider {
    #[default]
    Sqlite,
    Sheets,
}

/// Where intent rows live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentsConfig {
    #[serde(default)]
    pub provider: IntentProvider,
    /// SQLite file used by the `sqlite` provider and by imports.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub sheets: SheetsConfig,
}

impl Default for IntentsConfig {
    fn default() -> Self {
        Self {
            provider: IntentProvider::default(),
            path: default_store_path(),
            sheets: SheetsConfig::default(),
        }
    }
}

/// Google Sheets range used as the intent CMS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default = "default_sheets_range")]
    pub range: String,
    #[serde(default = "default_sheets_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,
    /// Env var holding the service account email.
    #[serde(default = "default_service_account_email_env")]
    pub service_account_email_env: String,
    /// Env var holding the service account PEM key; `\n` escapes are expanded.
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            range: default_sheets_range(),
            endpoint: default_sheets_endpoint(),
            api_key_env: default_api_key_env(),
            access_token_env: default_access_token_env(),
            service_account_email_env: default_service_account_email_env(),
            private_key_env: default_private_key_env(),
            token_uri: default_token_uri(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Credential found in the environment for the Sheets API.
#[derive(Clone, PartialEq, Eq)]
pub enum SheetsSecret {
    ApiKey(String),
    AccessToken(String),
    ServiceAccount {
        client_email: String,
        private_key: String,
    },
}

impl std::fmt::Debug for SheetsSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey([REDACTED])"),
            Self::AccessToken(_) => f.write_str("AccessToken([REDACTED])"),
            Self::ServiceAccount { client_email, .. } => f
                .debug_struct("ServiceAccount")
                .field("client_email", client_email)
                .field("private_key", &"[REDACTED]")
                .finish(),
        }
    }
}

impl SheetsConfig {
    /// Read the credential: an access token first, then a service account
    /// (email and key both set), then an API key.
    pub fn resolve_secret(&self) -> Option<SheetsSecret> {
        let read = |name: &str| std::env::var(name).ok().filter(|value| !value.is_empty());
        let service_account = || {
            let client_email = read(&self.service_account_email_env)?;
            let private_key = read(&self.private_key_env)?.replace("\\n", "\n");
            Some(SheetsSecret::ServiceAccount {
                client_email,
                private_key,
            })
        };
        read(&self.access_token_env)
            .map(SheetsSecret::AccessToken)
            .or_else(service_account)
            .or_else(|| read(&self.api_key_env).map(SheetsSecret::ApiKey))
    }
}

fn default_sheets_range() -> String {
    "responses!A:G".to_string()
}

fn default_sheets_endpoint() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_SHEETS_API_KEY".to_string()
}

fn default_access_token_env() -> String {
    "GOOGLE_SHEETS_ACCESS_TOKEN".to_string()
}

fn default_service_account_email_env() -> String {
    "GOOGLE_SERVICE_ACCOUNT_EMAIL".to_string()
}

fn default_private_key_env() -> String {
    "GOOGLE_PRIVATE_KEY".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}
