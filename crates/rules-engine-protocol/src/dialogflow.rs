//! Dialogflow v2 fulfillment payloads.

use serde::Serialize;
use serde_json::{Map, Value};

/// Session used when the caller sends none.
pub const DEFAULT_SESSION: &str = "unknown_session";
/// Value of `source` on fulfillments produced from the intent table.
pub const FULFILLMENT_SOURCE: &str = "rules-engine";

/// Canonical input for the intent pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentRequest {
    /// `queryResult.intent.displayName`, absent when empty.
    pub intent_name: Option<String>,
    pub parameters: Map<String, Value>,
    pub session: String,
}

impl IntentRequest {
    /// Adapt a Dialogflow webhook body. Never fails: a body without an
    /// intent is a valid request that gets the fallback fulfillment.
    pub fn from_value(body: &Value) -> Self {
        let query = body.get("queryResult");
        let intent_name = query
            .and_then(|query| query.pointer("/intent/displayName"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let parameters = query
            .and_then(|query| query.get("parameters"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let session = body
            .get("session")
            .and_then(Value::as_str)
            .filter(|session| !session.is_empty())
            .unwrap_or(DEFAULT_SESSION)
            .to_string();
        Self {
            intent_name,
            parameters,
            session,
        }
    }
}

/// Fields still to collect, passed back for the caller to prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectPayload {
    pub collect_fields: Vec<String>,
}

/// Body returned to Dialogflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResponse {
    pub fulfillment_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<CollectPayload>,
}

impl FulfillmentResponse {
    /// Plain text with no source attribution.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            fulfillment_text: text.into(),
            source: None,
            payload: None,
        }
    }

    /// Reply taken from an intent row.
    pub fn matched(text: impl Into<String>, collect_fields: Vec<String>) -> Self {
        Self {
            fulfillment_text: text.into(),
            source: Some(FULFILLMENT_SOURCE.to_string()),
            payload: (!collect_fields.is_empty()).then_some(CollectPayload { collect_fields }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FulfillmentResponse, IntentRequest};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reads_intent_parameters_and_session() {
        let request = IntentRequest::from_value(&json!({
            "session": "projects/p/agent/sessions/s1",
            "queryResult": {
                "intent": { "displayName": "reservar_mesa" },
                "parameters": { "personas": 4 }
            }
        }));
        assert_eq!(request.intent_name.as_deref(), Some("reservar_mesa"));
        assert_eq!(request.parameters["personas"], json!(4));
        assert_eq!(request.session, "projects/p/agent/sessions/s1");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let request = IntentRequest::from_value(&json!({ "queryResult": { "intent": {} } }));
        assert_eq!(request.intent_name, None);
        assert!(request.parameters.is_empty());
        assert_eq!(request.session, "unknown_session");
    }

    #[test]
    fn fulfillment_shapes() {
        assert_eq!(
            serde_json::to_value(FulfillmentResponse::text("fallback")).expect("json"),
            json!({ "fulfillmentText": "fallback" })
        );
        assert_eq!(
            serde_json::to_value(FulfillmentResponse::matched("ok", Vec::new())).expect("json"),
            json!({ "fulfillmentText": "ok", "source": "rules-engine" })
        );
        assert_eq!(
            serde_json::to_value(FulfillmentResponse::matched("ok", vec!["hora".to_string()]))
                .expect("json"),
            json!({
                "fulfillmentText": "ok",
                "source": "rules-engine",
                "payload": { "collect_fields": ["hora"] }
            })
        );
    }
}
