//! Direct intent lookup and shared error bodies.

use rules_engine_source::IntentRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a direct lookup by intent name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LookupRequest {
    /// Name or numeric id; a bare JSON number is accepted as an id.
    #[serde(default)]
    pub intent_name: Option<Value>,
}

impl LookupRequest {
    /// Requested intent name, if present and not blank.
    pub fn intent_name(&self) -> Option<String> {
        match self.intent_name.as_ref()? {
            Value::String(name) if !name.trim().is_empty() => Some(name.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Successful direct lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResponse {
    pub ok: bool,
    pub data: IntentRecord,
}

impl LookupResponse {
    pub fn new(data: IntentRecord) -> Self {
        Self { ok: true, data }
    }
}

/// `{"error": "..."}` body used by every non-Dialogflow failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LookupRequest;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request(body: serde_json::Value) -> LookupRequest {
        serde_json::from_value(body).expect("request")
    }

    #[test]
    fn intent_name_accepts_text_and_ids() {
        assert_eq!(
            request(json!({ "intent_name": "reservar_mesa" })).intent_name(),
            Some("reservar_mesa".to_string())
        );
        assert_eq!(request(json!({ "intent_name": 7 })).intent_name(), Some("7".to_string()));
    }

    #[test]
    fn blank_or_absent_name_is_none() {
        assert_eq!(request(json!({})).intent_name(), None);
        assert_eq!(request(json!({ "intent_name": "  " })).intent_name(), None);
        assert_eq!(request(json!({ "intent_name": null })).intent_name(), None);
    }
}
