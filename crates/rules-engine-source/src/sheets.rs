//! Intent source reading a Google Sheets range.

use crate::error::SourceError;
use crate::model::IntentRecord;
use crate::provider::IntentSource;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info, warn};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default Sheets API endpoint.
pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com";
/// Default range holding the intent table.
pub const DEFAULT_SHEETS_RANGE: &str = "responses!A:G";
/// Default OAuth token endpoint for service accounts.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Cached tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// How requests to the Sheets API are authorized.
#[derive(Clone, Default)]
pub enum SheetsCredential {
    /// No credential (public sheets or a test server).
    #[default]
    None,
    /// API key sent as the `key` query parameter.
    ApiKey(String),
    /// OAuth access token sent as a bearer header.
    AccessToken(String),
    /// Service account key exchanged for short-lived access tokens.
    ServiceAccount(ServiceAccountKey),
}

/// Service account identity used to mint bearer tokens.
#[derive(Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM encoded RSA private key.
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Key for the default Google token endpoint.
    pub fn new(client_email: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            client_email: client_email.into(),
            private_key: private_key.into(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl fmt::Debug for SheetsCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::ApiKey(_) => write!(f, "ApiKey([REDACTED])"),
            Self::AccessToken(_) => write!(f, "AccessToken([REDACTED])"),
            Self::ServiceAccount(key) => write!(f, "ServiceAccount({key:?})"),
        }
    }
}

/// Connection options for [`SheetsIntentSource`].
#[derive(Debug, Clone)]
pub struct SheetsOptions {
    pub endpoint: String,
    pub spreadsheet_id: String,
    pub range: String,
    pub credential: SheetsCredential,
    pub timeout: Duration,
}

impl SheetsOptions {
    /// Options for a spreadsheet with default endpoint, range and timeout.
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_SHEETS_ENDPOINT.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            range: DEFAULT_SHEETS_RANGE.to_string(),
            credential: SheetsCredential::None,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN
    }
}

/// Reads the whole range on every lookup; the sheet is the CMS.
#[derive(Debug, Clone)]
pub struct SheetsIntentSource {
    client: reqwest::Client,
    url: Url,
    credential: SheetsCredential,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl SheetsIntentSource {
    pub fn new(options: SheetsOptions) -> Result<Self, SourceError> {
        let mut url = Url::parse(&options.endpoint)
            .map_err(|err| SourceError::Unavailable(format!("invalid sheets endpoint: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Unavailable("sheets endpoint cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                options.spreadsheet_id.as_str(),
                "values",
                options.range.as_str(),
            ]);
        let client = reqwest::Client::builder().timeout(options.timeout).build()?;
        debug!("configured sheets intent source (range={})", options.range);
        Ok(Self {
            client,
            url,
            credential: options.credential,
            token: Arc::new(Mutex::new(None)),
        })
    }

    async fn fetch_values(&self) -> Result<Vec<Vec<Value>>, SourceError> {
        let request = self.client.get(self.url.clone());
        let request = match &self.credential {
            SheetsCredential::None => request,
            SheetsCredential::ApiKey(key) => request.query(&[("key", key)]),
            SheetsCredential::AccessToken(token) => request.bearer_auth(token),
            SheetsCredential::ServiceAccount(key) => {
                request.bearer_auth(self.service_account_token(key).await?)
            }
        };
        let response = request.send().await?.error_for_status()?;
        let range: ValueRange = response.json().await?;
        Ok(range.values)
    }

    /// Cached access token, exchanging a fresh assertion when it is near expiry.
    async fn service_account_token(&self, key: &ServiceAccountKey) -> Result<String, SourceError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let assertion = sign_assertion(key, chrono::Utc::now().timestamp())?;
        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SourceError::Auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }
        let granted: TokenResponse = response.json().await?;
        let lifetime = granted
            .expires_in
            .unwrap_or(ASSERTION_LIFETIME_SECS as u64);
        info!(
            "minted sheets access token (account={}, expires_in={})",
            key.client_email, lifetime
        );
        let token = CachedToken {
            access_token: granted.access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        };
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}

/// RS256 JWT asserting the service account identity for the read-only scope.
fn sign_assertion(key: &ServiceAccountKey, issued_at: i64) -> Result<String, SourceError> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: READONLY_SCOPE,
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|err| SourceError::Auth(format!("invalid private key: {err}")))?;
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|err| SourceError::Auth(format!("failed to sign assertion: {err}")))
}

#[async_trait]
impl IntentSource for SheetsIntentSource {
    async fn list_all(&self) -> Result<Vec<IntentRecord>, SourceError> {
        let values = self.fetch_values().await?;
        let intents = parse_rows(values);
        debug!("loaded intents from sheet (count={})", intents.len());
        Ok(intents)
    }
}

/// Convert a header row plus data rows into intents, skipping unusable rows.
fn parse_rows(mut values: Vec<Vec<Value>>) -> Vec<IntentRecord> {
    if values.is_empty() {
        return Vec::new();
    }
    let headers: Vec<String> = values
        .remove(0)
        .iter()
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();

    let mut intents = Vec::new();
    for (idx, row) in values.iter().enumerate() {
        let fields: HashMap<String, String> = headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let value = row.get(col).map(cell_text).unwrap_or_default();
                (header.clone(), value)
            })
            .collect();
        match IntentRecord::from_fields(&fields) {
            Ok(intent) => intents.push(intent),
            Err(reason) => warn!("skipping sheet row (row={}, reason={})", idx + 2, reason),
        }
    }
    intents
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
