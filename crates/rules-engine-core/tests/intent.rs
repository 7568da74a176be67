//! Intent resolver behavior.

use pretty_assertions::assert_eq;
use rules_engine_core::{IntentResolver, ResolveError};
use rules_engine_source::IntentRecord;
use rules_engine_test_utils::{StubIntentSource, reservar_mesa_intent};
use std::sync::Arc;

fn intent(id: u64, name: &str, text: &str, active: bool) -> IntentRecord {
    IntentRecord {
        intent_id: id,
        intent_name: name.to_string(),
        examples: Vec::new(),
        response_text: text.to_string(),
        collect_fields: Vec::new(),
        active,
    }
}

/// Lookup by id and by name return the same row.
#[tokio::test]
async fn resolves_by_id_or_name() {
    let source = StubIntentSource::new(vec![
        intent(2, "horario", "9 a 18", true),
        reservar_mesa_intent(),
    ]);
    let resolver = IntentResolver::new(Arc::new(source));

    let by_id = resolver.resolve("7").await.expect("resolve").expect("found");
    let by_name = resolver
        .resolve("reservar_mesa")
        .await
        .expect("resolve")
        .expect("found");
    assert_eq!(by_id, by_name);
    assert_eq!(by_id.response_text, "¿Para cuántas personas?");
}

/// Names match case-insensitively.
#[tokio::test]
async fn name_match_ignores_case() {
    let resolver = IntentResolver::new(Arc::new(StubIntentSource::new(vec![reservar_mesa_intent()])));
    let upper = resolver.resolve("Reservar_Mesa").await.expect("resolve");
    let lower = resolver.resolve("reservar_mesa").await.expect("resolve");
    assert_eq!(upper, lower);
    assert!(upper.is_some());
}

/// Inactive rows are never returned, and later active rows still can be.
#[tokio::test]
async fn inactive_intents_are_excluded() {
    let source = StubIntentSource::new(vec![
        intent(1, "promo", "vieja", false),
        intent(3, "PROMO", "nueva", true),
        intent(4, "cerrado", "x", false),
    ]);
    let resolver = IntentResolver::new(Arc::new(source));

    let found = resolver.resolve("promo").await.expect("resolve").expect("found");
    assert_eq!(found.response_text, "nueva");
    assert_eq!(resolver.resolve("cerrado").await.expect("resolve"), None);
    assert_eq!(resolver.resolve("4").await.expect("resolve"), None);
}

/// Misses are `None`, and blank input skips the source.
#[tokio::test]
async fn not_found_and_blank_input() {
    let source = StubIntentSource::new(vec![reservar_mesa_intent()]);
    let resolver = IntentResolver::new(Arc::new(source.clone()));
    assert_eq!(resolver.resolve("desconocido").await.expect("resolve"), None);
    assert_eq!(resolver.resolve("  ").await.expect("resolve"), None);
    assert_eq!(source.reads(), 1);
}

/// Source failures propagate.
#[tokio::test]
async fn unavailable_source_is_an_error() {
    let resolver = IntentResolver::new(Arc::new(StubIntentSource::offline()));
    let err = resolver.resolve("7").await.unwrap_err();
    assert!(matches!(err, ResolveError::SourceUnavailable(_)));
}
