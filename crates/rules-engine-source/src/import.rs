//! Offline import of intent rows from a delimited file.

use crate::error::ImportError;
use crate::model::IntentRecord;
use crate::sqlite::SqliteIntentSource;
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;

/// Columns the import file must provide.
const REQUIRED_COLUMNS: &[&str] = &["intent_id", "intent_name"];

/// Counts reported after an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Data rows read from the file.
    pub read: usize,
    /// Rows upserted into the store.
    pub imported: usize,
    /// Rows skipped for missing id or name.
    pub skipped: usize,
}

/// Import a CSV file into the intent store, upserting by `intent_id`.
pub async fn import_csv(
    path: impl AsRef<Path>,
    target: &SqliteIntentSource,
) -> Result<ImportReport, ImportError> {
    let path = path.as_ref();
    info!("importing intents (path={})", path.display());
    let contents = tokio::fs::read_to_string(path).await?;
    let rows = read_rows(&contents)?;

    let mut report = ImportReport {
        read: rows.len(),
        ..ImportReport::default()
    };
    let mut intents = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        match IntentRecord::from_fields(row) {
            Ok(intent) => intents.push(intent),
            Err(reason) => {
                report.skipped += 1;
                warn!("skipping import row (line={}, reason={})", idx + 2, reason);
            }
        }
    }
    report.imported = target.upsert_all(intents).await?;
    info!(
        "import finished (read={}, imported={}, skipped={})",
        report.read, report.imported, report.skipped
    );
    Ok(report)
}

/// Parse CSV contents into header-keyed rows.
///
/// Short rows are padded with empty cells and rows with no content are
/// dropped.
pub fn read_rows(contents: &str) -> Result<Vec<HashMap<String, String>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Ok(Vec::new());
    }
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(ImportError::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string).chain(std::iter::repeat(String::new())))
                .collect(),
        );
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::read_rows;
    use crate::ImportError;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_rows_handles_quotes_crlf_and_multiline_cells() {
        let rows = read_rows(
            "\u{feff}intent_id,intent_name,response_text\r\n\
             1,saludo,\"Hola, \"\"amigo\"\"\"\r\n\
             2,horario,\"Abrimos\na las 9\"\r\n",
        )
        .expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["intent_id"], "1");
        assert_eq!(rows[0]["response_text"], "Hola, \"amigo\"");
        assert_eq!(rows[1]["response_text"], "Abrimos\na las 9");
    }

    #[test]
    fn read_rows_ignores_cells_past_the_header() {
        let rows = read_rows("intent_id,intent_name\n 3 , menu ,extra,more\n").expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0]["intent_id"], "3");
        assert_eq!(rows[0]["intent_name"], "menu");
    }

    #[test]
    fn read_rows_keys_by_header_and_skips_blank_lines() {
        let rows = read_rows("intent_id,intent_name,active\n7,reservar_mesa\n\n8,menu,FALSE\n")
            .expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["intent_name"], "reservar_mesa");
        assert_eq!(rows[0]["active"], "");
        assert_eq!(rows[1]["active"], "FALSE");
    }

    #[test]
    fn read_rows_requires_id_and_name_columns() {
        let err = read_rows("intent_name,response_text\nx,y\n").unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(column) if column == "intent_id"));
    }
}
