//! ManyChat external-request payloads.

use crate::error::PayloadError;
use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;

/// Contact id as sent by the caller, echoed back in the same JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContactId {
    Text(String),
    Number(Number),
}

impl ContactId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.is_empty() => Some(Self::Text(text.clone())),
            Value::Number(number) => Some(Self::Number(number.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Canonical input for the keyword pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRequest {
    pub contact_id: ContactId,
    pub user_name: String,
    /// Raw message as received; resolvers normalize it.
    pub message: String,
}

impl KeywordRequest {
    /// Adapt a ManyChat body.
    ///
    /// Contact id comes from `contact_id` or `contact.id`, the user name
    /// from `user_name` or `user.name`, and the message from `message` or
    /// `text`. Only the contact id is required.
    pub fn from_value(body: &Value) -> Result<Self, PayloadError> {
        let contact_id = first_present(body, &[&["contact_id"], &["contact", "id"]])
            .and_then(ContactId::from_value)
            .ok_or(PayloadError::MissingField("contact_id"))?;
        let user_name = first_text(body, &[&["user_name"], &["user", "name"]]);
        let message = first_text(body, &[&["message"], &["text"]]);
        Ok(Self {
            contact_id,
            user_name,
            message,
        })
    }
}

/// First non-empty value found at any of `paths`.
fn first_present<'a>(body: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| {
        let value = path.iter().try_fold(body, |value, key| value.get(key))?;
        match value {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            other => Some(other),
        }
    })
}

fn first_text(body: &Value, paths: &[&[&str]]) -> String {
    match first_present(body, paths) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Echo of the request fields returned alongside the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyMeta {
    pub contact_id: ContactId,
    pub user_name: String,
    pub received_message: String,
}

/// Success body for the keyword webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordReply {
    pub ok: bool,
    pub reply: String,
    pub meta: ReplyMeta,
}

impl KeywordReply {
    pub fn new(request: KeywordRequest, reply: impl Into<String>) -> Self {
        Self {
            ok: true,
            reply: reply.into(),
            meta: ReplyMeta {
                contact_id: request.contact_id,
                user_name: request.user_name,
                received_message: request.message,
            },
        }
    }
}
