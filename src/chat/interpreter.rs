//! Question interpretation for the chat surface.
//!
//! Classifies free text into a fixed set of intents by substring match and
//! turns the outcome of the underlying database calls into display strings.
//! `answer` never returns an error; every failure becomes a message.

use crate::db::DatabaseClient;
use crate::error::{ParleyError, Result};
use tracing::debug;

/// Reply when no connection has been established yet.
pub const NOT_CONNECTED_REPLY: &str = "Please connect to a database first.";

/// Reply for questions matching no known pattern.
pub const UNKNOWN_REPLY: &str = "I'm not sure how to answer that.";

/// The literal marker the table name follows in a row-count question.
const TABLE_MARKER: &str = "in table";

/// What a question is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// "how many rows ..." with the extracted table name.
    RowCount { table: String },
    /// "what tables ..."
    ListTables,
    /// Anything else.
    Unknown,
}

impl Intent {
    /// Classifies a question by case-insensitive substring match.
    ///
    /// "how many rows" takes precedence over "what tables" when both occur.
    pub fn classify(text: &str) -> Self {
        let lowered = text.to_lowercase();
        if lowered.contains("how many rows") {
            Self::RowCount {
                table: extract_table_name(text),
            }
        } else if lowered.contains("what tables") {
            Self::ListTables
        } else {
            Self::Unknown
        }
    }
}

/// Extracts the table name from a row-count question.
///
/// Takes the text after the last literal `in table`, trims whitespace, then
/// strips single quotes from both ends. When the marker is absent the whole
/// question is treated as the table name.
pub fn extract_table_name(text: &str) -> String {
    let tail = text.rsplit(TABLE_MARKER).next().unwrap_or(text);
    tail.trim().trim_matches('\'').to_string()
}

/// Builds the row-count statement for a table name, verbatim.
pub fn count_statement(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table};")
}

/// Answers a question against the given connection, if any.
///
/// Short-circuits when no connection exists; otherwise classifies, runs the
/// matching database call, and formats the result or the error as a string.
pub async fn answer(db: Option<&dyn DatabaseClient>, text: &str) -> String {
    let Some(db) = db else {
        return NOT_CONNECTED_REPLY.to_string();
    };

    match Intent::classify(text) {
        Intent::RowCount { table } => match count_rows(db, &table).await {
            Ok(count) => format!("There are {count} rows in the '{table}' table."),
            Err(e) => format!("Error: {}", e.message()),
        },
        Intent::ListTables => match db.list_tables().await {
            Ok(tables) => format!("Tables in the database: {}", tables.join(", ")),
            Err(e) => format!("Error: {}", e.message()),
        },
        Intent::Unknown => UNKNOWN_REPLY.to_string(),
    }
}

/// Runs the count statement once the name has matched the catalog listing.
///
/// Extraction can produce arbitrary text, so nothing reaches the server
/// until the name is confirmed to be an existing table.
async fn count_rows(db: &dyn DatabaseClient, table: &str) -> Result<i64> {
    let known = db.list_tables().await?;
    if !known.iter().any(|t| t == table) {
        return Err(ParleyError::query(format!("Unknown table '{table}'")));
    }

    let sql = count_statement(table);
    debug!("Running count: {sql}");
    db.fetch_count(&sql).await
}
