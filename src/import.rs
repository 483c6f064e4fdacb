//! CSV import: preview a file and append its rows into a table.
//!
//! The table is created with TEXT columns when missing; every value is
//! bound as a parameter, never spliced into the statement text.

use crate::db::DatabaseClient;
use crate::error::{ParleyError, Result};
use std::path::Path;
use tracing::info;

/// How many data rows a preview shows.
pub const PREVIEW_ROWS: usize = 5;

/// A bounded look at a CSV file before importing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPreview {
    /// Header row.
    pub headers: Vec<String>,
    /// Up to [`PREVIEW_ROWS`] data rows.
    pub rows: Vec<Vec<String>>,
    /// Total number of data rows in the file.
    pub total_rows: usize,
}

impl CsvPreview {
    /// Renders the preview as display text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.headers.join(" | "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join(" | "));
            out.push('\n');
        }
        if self.total_rows > self.rows.len() {
            out.push_str(&format!(
                "... ({} of {} rows shown)\n",
                self.rows.len(),
                self.total_rows
            ));
        }
        out
    }
}

/// Reads the file and returns headers, a bounded sample, and the row total.
pub fn preview(path: &Path) -> Result<CsvPreview> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader, path)?;

    let mut rows = Vec::new();
    let mut total_rows = 0;
    for record in reader.records() {
        let record = record.map_err(|e| malformed(path, e))?;
        if total_rows < PREVIEW_ROWS {
            rows.push(record.iter().map(str::to_string).collect());
        }
        total_rows += 1;
    }

    Ok(CsvPreview {
        headers,
        rows,
        total_rows,
    })
}

/// Appends every row of the file into the named table, creating the table
/// with TEXT columns when it does not exist. Returns the inserted row count.
pub async fn import_csv(db: &dyn DatabaseClient, path: &Path, table: &str) -> Result<u64> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader, path)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    db.ensure_table(table, &headers).await?;
    let inserted = db.insert_rows(table, &headers, &rows).await?;
    info!("Imported {} rows from {} into {}", inserted, path.display(), table);
    Ok(inserted)
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::Reader::from_path(path)
        .map_err(|e| ParleyError::import(format!("Failed to read {}: {e}", path.display())))
}

fn read_headers(reader: &mut csv::Reader<std::fs::File>, path: &Path) -> Result<Vec<String>> {
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err(ParleyError::import(format!(
            "{} has no header row",
            path.display()
        )));
    }
    Ok(headers)
}

fn malformed(path: &Path, e: csv::Error) -> ParleyError {
    ParleyError::import(format!("Malformed CSV in {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockDatabaseClient;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_preview_small_file() {
        let file = write_csv("name,city\nada,london\ngrace,new york\n");
        let preview = preview(file.path()).unwrap();

        assert_eq!(preview.headers, vec!["name", "city"]);
        assert_eq!(preview.total_rows, 2);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[0], vec!["ada", "london"]);
    }

    #[test]
    fn test_preview_is_bounded() {
        let mut content = String::from("n\n");
        for i in 0..20 {
            content.push_str(&format!("{i}\n"));
        }
        let file = write_csv(&content);
        let preview = preview(file.path()).unwrap();

        assert_eq!(preview.rows.len(), PREVIEW_ROWS);
        assert_eq!(preview.total_rows, 20);
        assert!(preview.render().contains("5 of 20 rows shown"));
    }

    #[test]
    fn test_preview_missing_file() {
        let result = preview(Path::new("no/such/file.csv"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.category(), "Import Error");
        assert!(err.to_string().contains("no/such/file.csv"));
    }

    #[test]
    fn test_preview_ragged_rows_error() {
        let file = write_csv("a,b\n1,2\n3\n");
        let result = preview(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Malformed CSV"));
    }

    #[tokio::test]
    async fn test_import_creates_and_fills_table() {
        let file = write_csv("name,city\nada,london\ngrace,new york\n");
        let db = MockDatabaseClient::new();

        let inserted = import_csv(&db, file.path(), "customers").await.unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(db.row_count("customers"), Some(2));
    }

    #[tokio::test]
    async fn test_import_appends_to_existing_table() {
        let file = write_csv("name\nada\n");
        let db = MockDatabaseClient::with_tables(&[("customers", 5)]);

        let inserted = import_csv(&db, file.path(), "customers").await.unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(db.row_count("customers"), Some(6));
    }

    #[tokio::test]
    async fn test_import_empty_file_inserts_nothing() {
        let file = write_csv("name,city\n");
        let db = MockDatabaseClient::new();

        let inserted = import_csv(&db, file.path(), "customers").await.unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(db.row_count("customers"), Some(0));
    }
}
