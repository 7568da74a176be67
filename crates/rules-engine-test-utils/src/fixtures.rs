use rules_engine_source::{IntentRecord, ResponseRecord};

/// The greeting record used across resolver and server tests.
pub fn greeting_record() -> ResponseRecord {
    ResponseRecord::new(["hola", "buenas"], "saludo general", "Hola — ¿en qué te ayudo?")
}

/// Active table-reservation intent with id 7.
pub fn reservar_mesa_intent() -> IntentRecord {
    IntentRecord {
        intent_id: 7,
        intent_name: "reservar_mesa".to_string(),
        examples: vec!["quiero reservar".to_string()],
        response_text: "¿Para cuántas personas?".to_string(),
        collect_fields: vec!["personas".to_string(), "hora".to_string()],
        active: true,
    }
}
