//! Record models served by lookup sources.

use crate::text::{normalize, split_multi_value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canned reply keyed by trigger keywords and a free-text description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ResponseRecord {
    /// Insertion sequence assigned by the source; lower wins ties.
    #[serde(default)]
    pub id: i64,
    /// Normalized exact-match triggers.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Description used for substring matching.
    #[serde(default)]
    pub message: String,
    /// Text returned to the caller.
    #[serde(default)]
    pub response: String,
}

impl ResponseRecord {
    /// Build a record, normalizing and de-duplicating its keywords.
    pub fn new<I, S>(keywords: I, message: impl Into<String>, response: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = normalize(keyword.as_ref());
            if !keyword.is_empty() && !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        Self {
            id: 0,
            keywords: normalized,
            message: message.into(),
            response: response.into(),
        }
    }

    /// Whether the record carries a usable reply.
    pub fn has_response(&self) -> bool {
        !self.response.trim().is_empty()
    }

    /// Set-membership test against the keyword list.
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|candidate| candidate == keyword)
    }
}

/// Intent row from the tabular CMS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntentRecord {
    pub intent_id: u64,
    pub intent_name: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub response_text: String,
    #[serde(default)]
    pub collect_fields: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl IntentRecord {
    /// Build an intent from a header-keyed row.
    ///
    /// Multi-value cells are pipe-separated. An empty `active` cell means
    /// active; otherwise only `TRUE` (any case) is active. Returns the reason
    /// when the row cannot be used.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, String> {
        let cell = |name: &str| fields.get(name).map(String::as_str).unwrap_or("");

        let raw_id = cell("intent_id").trim();
        let intent_id = raw_id
            .parse::<u64>()
            .map_err(|_| format!("missing or non-numeric intent_id {raw_id:?}"))?;
        let intent_name = cell("intent_name").trim().to_string();
        if intent_name.is_empty() {
            return Err(format!("intent {intent_id} has no intent_name"));
        }
        let active = match cell("active").trim() {
            "" => true,
            value => value.eq_ignore_ascii_case("true"),
        };

        Ok(Self {
            intent_id,
            intent_name,
            examples: split_multi_value(cell("examples")),
            response_text: cell("response_text").to_string(),
            collect_fields: split_multi_value(cell("collect_fields")),
            active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{IntentRecord, ResponseRecord};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn response_record_normalizes_keywords() {
        let record = ResponseRecord::new([" Hola", "BUENAS", "hola", ""], "saludo", "Hola!");
        assert_eq!(record.keywords, vec!["hola".to_string(), "buenas".to_string()]);
        assert!(record.has_keyword("buenas"));
        assert!(!record.has_keyword("Buenas"));
    }

    #[test]
    fn blank_response_is_not_usable() {
        let record = ResponseRecord::new(["x"], "", "   ");
        assert!(!record.has_response());
    }

    #[test]
    fn intent_from_fields_parses_multi_values_and_active() {
        let intent = IntentRecord::from_fields(&row(&[
            ("intent_id", " 7 "),
            ("intent_name", "reservar_mesa"),
            ("examples", "quiero reservar | mesa para dos"),
            ("response_text", "¿Para cuántas personas?"),
            ("collect_fields", "personas|hora"),
            ("active", "true"),
        ]))
        .expect("intent");
        assert_eq!(intent.intent_id, 7);
        assert_eq!(intent.examples.len(), 2);
        assert_eq!(
            intent.collect_fields,
            vec!["personas".to_string(), "hora".to_string()]
        );
        assert!(intent.active);
    }

    #[test]
    fn intent_from_fields_defaults_and_rejections() {
        let intent = IntentRecord::from_fields(&row(&[
            ("intent_id", "3"),
            ("intent_name", "horario"),
        ]))
        .expect("intent");
        assert!(intent.active);
        assert!(intent.examples.is_empty());

        let inactive = IntentRecord::from_fields(&row(&[
            ("intent_id", "4"),
            ("intent_name", "menu"),
            ("active", "FALSE"),
        ]))
        .expect("intent");
        assert!(!inactive.active);

        assert!(IntentRecord::from_fields(&row(&[("intent_name", "x")])).is_err());
        assert!(IntentRecord::from_fields(&row(&[("intent_id", "abc"), ("intent_name", "x")])).is_err());
        assert!(IntentRecord::from_fields(&row(&[("intent_id", "5")])).is_err());
    }
}
