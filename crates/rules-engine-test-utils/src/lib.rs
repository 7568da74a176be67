//! Test helpers shared across rules-engine crates.

pub mod documents;
pub mod fixtures;
pub mod intents;

pub use documents::{DocumentCall, StubDocumentSource};
pub use fixtures::{greeting_record, reservar_mesa_intent};
pub use intents::StubIntentSource;
