//! Keyword resolver behavior over a recording document source.

use pretty_assertions::assert_eq;
use rules_engine_core::{KeywordResolver, ResolveError};
use rules_engine_source::{PatternMode, PatternQuery, ResponseRecord};
use rules_engine_test_utils::{DocumentCall, StubDocumentSource, greeting_record};
use std::sync::Arc;

const DEFAULT_REPLY: &str = "Gracias — en breve le respondemos.";

fn resolver(source: &StubDocumentSource) -> KeywordResolver {
    KeywordResolver::new(Arc::new(source.clone()), DEFAULT_REPLY)
}

/// An exact keyword hit answers without running later strategies.
#[tokio::test]
async fn exact_keyword_short_circuits() {
    let source = StubDocumentSource::new(vec![greeting_record()]);
    let resolution = resolver(&source).resolve("Hola").await.expect("resolve");

    assert_eq!(resolution.response_text, "Hola — ¿en qué te ayudo?");
    assert_eq!(resolution.strategy, Some("exact_keyword"));
    assert!(!resolution.is_default);
    assert_eq!(source.calls(), vec![DocumentCall::Keyword("hola".to_string())]);
}

/// Token overlap answers when neither exact nor substring match.
#[tokio::test]
async fn token_match_after_exact_and_pattern_miss() {
    let source = StubDocumentSource::new(vec![greeting_record()]);
    let resolution = resolver(&source)
        .resolve("  Hola, buenas tardes  ")
        .await
        .expect("resolve");

    assert_eq!(resolution.response_text, "Hola — ¿en qué te ayudo?");
    assert_eq!(resolution.strategy, Some("token"));
    assert_eq!(
        source.calls(),
        vec![
            DocumentCall::Keyword("hola, buenas tardes".to_string()),
            DocumentCall::Pattern(PatternQuery::new(
                "hola, buenas tardes",
                PatternMode::MessageSubstringOrKeyword,
            )),
            DocumentCall::Any(vec![
                "hola,".to_string(),
                "buenas".to_string(),
                "tardes".to_string(),
            ]),
        ]
    );
}

/// Nothing matching falls through to the configured default.
#[tokio::test]
async fn unmatched_input_returns_default() {
    let source = StubDocumentSource::new(vec![greeting_record()]);
    let resolution = resolver(&source).resolve("xyz123").await.expect("resolve");

    assert!(resolution.is_default);
    assert_eq!(resolution.matched, None);
    assert_eq!(resolution.response_text, DEFAULT_REPLY);
    assert_eq!(source.call_count(), 3);
}

/// Empty and whitespace-only messages never reach the source.
#[tokio::test]
async fn empty_input_returns_default_without_lookups() {
    let source = StubDocumentSource::new(vec![greeting_record()]);
    let resolver = resolver(&source);
    for message in ["", "   ", "\n\t"] {
        let resolution = resolver.resolve(message).await.expect("resolve");
        assert!(resolution.is_default);
        assert_eq!(resolution.response_text, DEFAULT_REPLY);
    }
    assert_eq!(source.call_count(), 0);
}

/// Substring hits use the message field, case-insensitively.
#[tokio::test]
async fn pattern_match_on_message() {
    let source = StubDocumentSource::new(vec![
        greeting_record(),
        ResponseRecord::new(["horario"], "Consulta de horario de apertura", "Abrimos de 9 a 18"),
    ]);
    let resolution = resolver(&source)
        .resolve("HORARIO DE APERTURA")
        .await
        .expect("resolve");
    assert_eq!(resolution.response_text, "Abrimos de 9 a 18");
    assert_eq!(resolution.strategy, Some("pattern"));
}

/// Metacharacters in the input are literal characters.
#[tokio::test]
async fn metacharacters_never_act_as_wildcards() {
    let source = StubDocumentSource::new(vec![ResponseRecord::new(["zzz"], "aXb", "wildcard")]);
    let resolution = resolver(&source).resolve("a.b").await.expect("resolve");
    assert!(resolution.is_default);

    let resolution = resolver(&source).resolve("(unclosed[").await.expect("resolve");
    assert!(resolution.is_default);
}

/// Records lacking a reply are ignored even when their keyword matches.
#[tokio::test]
async fn records_without_reply_are_ignored() {
    let source = StubDocumentSource::new(vec![
        ResponseRecord::new(["precio"], "precios", " "),
        ResponseRecord::new(["precio"], "lista", "Desde 10€"),
    ]);
    let resolution = resolver(&source).resolve("precio").await.expect("resolve");
    assert_eq!(resolution.response_text, "Desde 10€");
    assert_eq!(resolution.matched.map(|record| record.id), Some(2));
}

/// Ties resolve to the earliest record.
#[tokio::test]
async fn first_record_wins_ties() {
    let source = StubDocumentSource::new(vec![
        ResponseRecord::new(["info"], "a", "primero"),
        ResponseRecord::new(["info"], "b", "segundo"),
    ]);
    let resolution = resolver(&source).resolve("info").await.expect("resolve");
    assert_eq!(resolution.response_text, "primero");
}

/// An unreachable source fails the resolution instead of defaulting.
#[tokio::test]
async fn unavailable_source_is_an_error() {
    let source = StubDocumentSource::offline();
    let err = resolver(&source).resolve("hola").await.unwrap_err();
    assert!(matches!(err, ResolveError::SourceUnavailable(_)));
    assert_eq!(source.call_count(), 1);
}
