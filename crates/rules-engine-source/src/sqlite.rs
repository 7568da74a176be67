//! SQLite backed document and intent stores.

use crate::error::SourceError;
use crate::model::{IntentRecord, ResponseRecord};
use crate::pattern::PatternQuery;
use crate::provider::{DocumentSource, IntentSource};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, params, params_from_iter};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS responses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message TEXT NOT NULL DEFAULT '',
    response TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS response_keywords (
    response_id INTEGER NOT NULL REFERENCES responses(id) ON DELETE CASCADE,
    keyword TEXT NOT NULL,
    PRIMARY KEY (response_id, keyword)
);
CREATE INDEX IF NOT EXISTS idx_response_keywords_keyword ON response_keywords(keyword);
CREATE TABLE IF NOT EXISTS intents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    intent_id INTEGER NOT NULL UNIQUE,
    intent_name TEXT NOT NULL,
    examples TEXT NOT NULL DEFAULT '[]',
    response_text TEXT NOT NULL DEFAULT '',
    collect_fields TEXT NOT NULL DEFAULT '[]',
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Shared SQLite connection with the schema applied.
///
/// Queries run on the blocking pool; one connection serves all callers.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self::initialize(conn)?;
        info!("opened sqlite store (path={})", path.display());
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, SourceError> {
        let store = Self::initialize(Connection::open_in_memory()?)?;
        debug!("opened in-memory sqlite store");
        Ok(store)
    }

    fn initialize(conn: Connection) -> Result<Self, SourceError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T, SourceError>
    where
        F: FnOnce(&mut Connection) -> Result<T, SourceError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut guard)
        })
        .await
        .map_err(|err| SourceError::Unavailable(format!("sqlite task failed: {err}")))?
    }

    async fn ping(&self) -> Result<(), SourceError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}

/// Document source over the `responses` tables.
#[derive(Clone)]
pub struct SqliteDocumentSource {
    store: SqliteStore,
}

impl SqliteDocumentSource {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Open a file-backed document source.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Self::new(SqliteStore::open(path)?))
    }

    /// Insert a record, returning its insertion id.
    pub async fn insert(&self, record: ResponseRecord) -> Result<i64, SourceError> {
        let record = ResponseRecord::new(&record.keywords, record.message, record.response);
        self.store
            .with_conn(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO responses (message, response) VALUES (?1, ?2)",
                    params![record.message, record.response],
                )?;
                let id = tx.last_insert_rowid();
                for keyword in &record.keywords {
                    tx.execute(
                        "INSERT INTO response_keywords (response_id, keyword) VALUES (?1, ?2)",
                        params![id, keyword],
                    )?;
                }
                tx.commit()?;
                debug!(
                    "inserted response record (id={}, keywords={})",
                    id,
                    record.keywords.len()
                );
                Ok(id)
            })
            .await
    }

    /// Every record in insertion order.
    pub async fn all(&self) -> Result<Vec<ResponseRecord>, SourceError> {
        self.store.with_conn(|conn| all_records(conn)).await
    }
}

#[async_trait]
impl DocumentSource for SqliteDocumentSource {
    async fn find_by_keyword(
        &self,
        keyword: &str,
    ) -> Result<Option<ResponseRecord>, SourceError> {
        let values = vec![keyword.to_string()];
        self.store
            .with_conn(move |conn| first_with_any_keyword(conn, &values))
            .await
    }

    async fn find_by_pattern(
        &self,
        query: &PatternQuery,
    ) -> Result<Option<ResponseRecord>, SourceError> {
        let pattern = query.compile()?;
        self.store
            .with_conn(move |conn| {
                let found = all_records(conn)?
                    .into_iter()
                    .find(|record| record.has_response() && pattern.matches(record));
                Ok(found)
            })
            .await
    }

    async fn find_by_any(&self, values: &[String]) -> Result<Option<ResponseRecord>, SourceError> {
        if values.is_empty() {
            return Ok(None);
        }
        let values = values.to_vec();
        self.store
            .with_conn(move |conn| first_with_any_keyword(conn, &values))
            .await
    }

    async fn ping(&self) -> Result<(), SourceError> {
        self.store.ping().await
    }
}

/// Keyword values bound per statement, below SQLite's host-parameter limit.
const KEYWORD_BATCH: usize = 500;

/// Lowest-id record with a usable reply whose keywords include any value.
///
/// Reply emptiness is checked with [`ResponseRecord::has_response`] so a
/// blank record never hides a later usable one.
fn first_with_any_keyword(
    conn: &Connection,
    values: &[String],
) -> Result<Option<ResponseRecord>, SourceError> {
    let mut best: Option<ResponseRecord> = None;
    for batch in values.chunks(KEYWORD_BATCH) {
        let placeholders = vec!["?"; batch.len()].join(", ");
        let sql = format!(
            "SELECT DISTINCT r.id, r.message, r.response FROM responses r \
             JOIN response_keywords k ON k.response_id = r.id \
             WHERE k.keyword IN ({placeholders}) \
             ORDER BY r.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(batch.iter()))?;
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            if best.as_ref().is_some_and(|found| found.id <= id) {
                break;
            }
            let candidate = ResponseRecord {
                id,
                keywords: Vec::new(),
                message: row.get(1)?,
                response: row.get(2)?,
            };
            if candidate.has_response() {
                best = Some(candidate);
                break;
            }
        }
    }
    let Some(mut record) = best else {
        return Ok(None);
    };
    record.keywords = keywords_for(conn, record.id)?;
    Ok(Some(record))
}

fn keywords_for(conn: &Connection, id: i64) -> Result<Vec<String>, SourceError> {
    let mut stmt = conn
        .prepare_cached("SELECT keyword FROM response_keywords WHERE response_id = ?1 ORDER BY rowid")?;
    let keywords = stmt
        .query_map([id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(keywords)
}

fn all_records(conn: &Connection) -> Result<Vec<ResponseRecord>, SourceError> {
    let mut keywords: HashMap<i64, Vec<String>> = HashMap::new();
    {
        let mut stmt = conn.prepare_cached(
            "SELECT response_id, keyword FROM response_keywords ORDER BY response_id, rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (id, keyword) = row?;
            keywords.entry(id).or_default().push(keyword);
        }
    }

    let mut stmt = conn.prepare_cached("SELECT id, message, response FROM responses ORDER BY id")?;
    let records = stmt
        .query_map([], |row| {
            Ok(ResponseRecord {
                id: row.get(0)?,
                keywords: Vec::new(),
                message: row.get(1)?,
                response: row.get(2)?,
            })
        })?
        .map(|row| {
            row.map(|mut record| {
                record.keywords = keywords.remove(&record.id).unwrap_or_default();
                record
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Intent source over the `intents` table, ordered by first insertion.
#[derive(Clone)]
pub struct SqliteIntentSource {
    store: SqliteStore,
}

impl SqliteIntentSource {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Open a file-backed intent source.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Self::new(SqliteStore::open(path)?))
    }

    /// Insert or update rows keyed by `intent_id` in one transaction.
    ///
    /// Updated rows keep their original position in source order.
    pub async fn upsert_all(&self, intents: Vec<IntentRecord>) -> Result<usize, SourceError> {
        self.store
            .with_conn(move |conn| {
                let now = Utc::now();
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare_cached(
                        "INSERT INTO intents (intent_id, intent_name, examples, response_text, \
                         collect_fields, active, created_at, updated_at) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
                         ON CONFLICT(intent_id) DO UPDATE SET \
                         intent_name = excluded.intent_name, \
                         examples = excluded.examples, \
                         response_text = excluded.response_text, \
                         collect_fields = excluded.collect_fields, \
                         active = excluded.active, \
                         updated_at = excluded.updated_at",
                    )?;
                    for intent in &intents {
                        let intent_id = i64::try_from(intent.intent_id).map_err(|_| {
                            SourceError::Unavailable(format!(
                                "intent_id {} exceeds sqlite range",
                                intent.intent_id
                            ))
                        })?;
                        stmt.execute(params![
                            intent_id,
                            intent.intent_name,
                            serde_json::to_string(&intent.examples)?,
                            intent.response_text,
                            serde_json::to_string(&intent.collect_fields)?,
                            intent.active,
                            now,
                        ])?;
                        debug!("upserted intent (intent_id={})", intent.intent_id);
                    }
                }
                tx.commit()?;
                Ok(intents.len())
            })
            .await
    }

    /// Insert or update a single row.
    pub async fn upsert(&self, intent: IntentRecord) -> Result<(), SourceError> {
        self.upsert_all(vec![intent]).await.map(|_| ())
    }
}

#[async_trait]
impl IntentSource for SqliteIntentSource {
    async fn list_all(&self) -> Result<Vec<IntentRecord>, SourceError> {
        self.store
            .with_conn(|conn| {
                let mut stmt = conn.prepare_cached(
                    "SELECT intent_id, intent_name, examples, response_text, collect_fields, active \
                     FROM intents ORDER BY seq",
                )?;
                let rows = stmt.query_map([], |row| {
                    let intent_id: i64 = row.get(0)?;
                    Ok((
                        u64::try_from(intent_id)
                            .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, intent_id))?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, bool>(5)?,
                    ))
                })?;
                let mut intents = Vec::new();
                for row in rows {
                    let (intent_id, intent_name, examples, response_text, collect_fields, active) =
                        row?;
                    intents.push(IntentRecord {
                        intent_id,
                        intent_name,
                        examples: serde_json::from_str(&examples)?,
                        response_text,
                        collect_fields: serde_json::from_str(&collect_fields)?,
                        active,
                    });
                }
                Ok(intents)
            })
            .await
    }

    async fn ping(&self) -> Result<(), SourceError> {
        self.store.ping().await
    }
}
