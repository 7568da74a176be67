//! Lookup sources for canned replies.
//!
//! This crate owns the record models, the read-only source traits consumed by
//! the resolvers, and the concrete SQLite and Google Sheets backends.

pub mod error;
pub mod import;
pub mod model;
pub mod pattern;
pub mod provider;
pub mod sheets;
pub mod sqlite;
mod text;

/// Source and import error types.
pub use error::{ImportError, SourceError};
/// Offline importer entry points.
pub use import::{ImportReport, import_csv};
/// Record models.
pub use model::{IntentRecord, ResponseRecord};
/// Literal pattern queries used by substring matching.
pub use pattern::{CompiledPattern, PatternMode, PatternQuery};
/// Source traits.
pub use provider::{DocumentSource, IntentSource};
/// Google Sheets backed intent source.
pub use sheets::{ServiceAccountKey, SheetsCredential, SheetsIntentSource, SheetsOptions};
/// SQLite backed sources.
pub use sqlite::{SqliteDocumentSource, SqliteIntentSource, SqliteStore};
/// Text helpers shared with the resolvers.
pub use text::{normalize, split_multi_value};
