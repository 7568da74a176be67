//! Schema validation helpers for rules-engine JSON5 configuration.
//!
//! Every layer is checked on its own so an unknown or mistyped key is
//! reported against the file that introduced it.

use crate::ConfigError;
use serde_json::{Map, Value};

const DOCUMENT_PROVIDERS: &[&str] = &["sqlite"];
const INTENT_PROVIDERS: &[&str] = &["sqlite", "sheets"];

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(
        map,
        &["$schema", "server", "auth", "replies", "documents", "intents"],
        layer,
        "",
    )?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("server") {
        validate_server(value, layer, "server")?;
    }
    if let Some(value) = map.get("auth") {
        validate_auth(value, layer, "auth")?;
    }
    if let Some(value) = map.get("replies") {
        validate_replies(value, layer, "replies")?;
    }
    if let Some(value) = map.get("documents") {
        validate_documents(value, layer, "documents")?;
    }
    if let Some(value) = map.get("intents") {
        validate_intents(value, layer, "intents")?;
    }
    Ok(())
}

fn validate_server(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["bind"], layer, path)?;
    if let Some(value) = map.get("bind") {
        expect_string(value, layer, &join_path(path, "bind"))?;
    }
    Ok(())
}

fn validate_auth(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["token", "token_env"], layer, path)?;
    if let Some(value) = map.get("token") {
        expect_optional_string(value, layer, &join_path(path, "token"))?;
    }
    if let Some(value) = map.get("token_env") {
        expect_string(value, layer, &join_path(path, "token_env"))?;
    }
    Ok(())
}

fn validate_replies(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = [
        "default_reply",
        "intent_fallback",
        "intent_not_found",
        "intent_unconfigured",
        "webhook_error",
    ];
    ensure_allowed_keys(map, &allowed, layer, path)?;
    for (key, value) in map {
        expect_string(value, layer, &join_path(path, key))?;
    }
    Ok(())
}

fn validate_documents(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["provider", "path"], layer, path)?;
    if let Some(value) = map.get("provider") {
        expect_one_of(value, DOCUMENT_PROVIDERS, layer, &join_path(path, "provider"))?;
    }
    if let Some(value) = map.get("path") {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    Ok(())
}

fn validate_intents(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["provider", "path", "sheets"], layer, path)?;
    if let Some(value) = map.get("provider") {
        expect_one_of(value, INTENT_PROVIDERS, layer, &join_path(path, "provider"))?;
    }
    if let Some(value) = map.get("path") {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    if let Some(value) = map.get("sheets") {
        validate_sheets(value, layer, &join_path(path, "sheets"))?;
    }
    Ok(())
}

fn validate_sheets(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = [
        "spreadsheet_id",
        "range",
        "endpoint",
        "api_key_env",
        "access_token_env",
        "service_account_email_env",
        "private_key_env",
        "token_uri",
        "timeout_secs",
    ];
    ensure_allowed_keys(map, &allowed, layer, path)?;
    if let Some(value) = map.get("spreadsheet_id") {
        expect_optional_string(value, layer, &join_path(path, "spreadsheet_id"))?;
    }
    for key in [
        "range",
        "endpoint",
        "api_key_env",
        "access_token_env",
        "service_account_email_env",
        "private_key_env",
        "token_uri",
    ] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("timeout_secs") {
        expect_u64(value, layer, &join_path(path, "timeout_secs"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

fn expect_optional_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_null() {
        return Ok(());
    }
    expect_string(value, layer, path)
}

/// Expect a non-negative JSON integer.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Expect a string drawn from a fixed set.
fn expect_one_of(
    value: &Value,
    options: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match value.as_str() {
        Some(text) if options.contains(&text) => Ok(()),
        Some(_) => Err(invalid_field(
            layer,
            path,
            &format!("expected one of: {}", options.join(", ")),
        )),
        None => Err(invalid_field(layer, path, "expected string")),
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
