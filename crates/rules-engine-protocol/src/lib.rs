//! Wire types for the webhook callers and their payload adapters.
//!
//! Each caller has its own body shape. Adapters turn those bodies into
//! canonical [`KeywordRequest`] and [`IntentRequest`] values before any
//! resolution runs, and the reply types serialize into the exact JSON each
//! caller expects back.

mod dialogflow;
mod error;
mod lookup;
mod manychat;

pub use dialogflow::{
    CollectPayload, DEFAULT_SESSION, FULFILLMENT_SOURCE, FulfillmentResponse, IntentRequest,
};
pub use error::PayloadError;
pub use lookup::{ErrorBody, LookupRequest, LookupResponse};
pub use manychat::{ContactId, KeywordReply, KeywordRequest, ReplyMeta};

/// Parse a request body as JSON, treating an empty body as `{}`.
pub fn parse_body(body: &[u8]) -> Result<serde_json::Value, PayloadError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    Ok(serde_json::from_slice(body)?)
}
