//! Mock database clients for testing.
//!
//! Provides an in-memory database implementation plus an always-failing
//! client for exercising error paths without a live server.

use super::DatabaseClient;
use crate::error::{ParleyError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// A mock database client backed by an in-memory table list.
///
/// Tables are (name, row count) pairs kept in insertion order, which is
/// what `list_tables` reports back.
pub struct MockDatabaseClient {
    tables: Mutex<Vec<(String, i64)>>,
}

impl MockDatabaseClient {
    /// Creates a new mock client with no tables.
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock client pre-populated with the given tables.
    pub fn with_tables(tables: &[(&str, i64)]) -> Self {
        Self {
            tables: Mutex::new(
                tables
                    .iter()
                    .map(|(name, rows)| (name.to_string(), *rows))
                    .collect(),
            ),
        }
    }

    /// Returns the current row count for a table, if it exists.
    pub fn row_count(&self, table: &str) -> Option<i64> {
        self.tables
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, rows)| *rows)
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn fetch_count(&self, sql: &str) -> Result<i64> {
        // Accepts only the count-statement shape the interpreter generates.
        let table = sql
            .strip_prefix("SELECT COUNT(*) FROM ")
            .and_then(|rest| rest.strip_suffix(';'))
            .ok_or_else(|| ParleyError::query(format!("Unsupported statement: {sql}")))?;

        self.row_count(table)
            .ok_or_else(|| ParleyError::query(format!("relation \"{table}\" does not exist")))
    }

    async fn ensure_table(&self, table: &str, _columns: &[String]) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.iter().any(|(name, _)| name == table) {
            tables.push((table.to_string(), 0));
        }
        Ok(())
    }

    async fn insert_rows(
        &self,
        table: &str,
        _columns: &[String],
        rows: &[Vec<String>],
    ) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let entry = tables
            .iter_mut()
            .find(|(name, _)| name == table)
            .ok_or_else(|| ParleyError::import(format!("relation \"{table}\" does not exist")))?;
        entry.1 += rows.len() as i64;
        Ok(rows.len() as u64)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A client whose every operation fails with the configured message.
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a failing client that reports the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn ping(&self) -> Result<()> {
        Err(ParleyError::connection(self.message.clone()))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Err(ParleyError::query(self.message.clone()))
    }

    async fn fetch_count(&self, _sql: &str) -> Result<i64> {
        Err(ParleyError::query(self.message.clone()))
    }

    async fn ensure_table(&self, _table: &str, _columns: &[String]) -> Result<()> {
        Err(ParleyError::import(self.message.clone()))
    }

    async fn insert_rows(
        &self,
        _table: &str,
        _columns: &[String],
        _rows: &[Vec<String>],
    ) -> Result<u64> {
        Err(ParleyError::import(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_lists_tables_in_insertion_order() {
        let client = MockDatabaseClient::with_tables(&[("orders", 3), ("customers", 7)]);
        let tables = client.list_tables().await.unwrap();
        assert_eq!(tables, vec!["orders", "customers"]);
    }

    #[tokio::test]
    async fn test_mock_fetch_count() {
        let client = MockDatabaseClient::with_tables(&[("customers", 7)]);
        let count = client
            .fetch_count("SELECT COUNT(*) FROM customers;")
            .await
            .unwrap();
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_mock_fetch_count_unknown_table() {
        let client = MockDatabaseClient::new();
        let result = client.fetch_count("SELECT COUNT(*) FROM ghosts;").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ghosts"));
    }

    #[tokio::test]
    async fn test_mock_insert_accumulates() {
        let client = MockDatabaseClient::new();
        let columns = vec!["name".to_string()];

        client.ensure_table("people", &columns).await.unwrap();
        let inserted = client
            .insert_rows(
                "people",
                &columns,
                &[vec!["ada".to_string()], vec!["grace".to_string()]],
            )
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(client.row_count("people"), Some(2));
    }

    #[tokio::test]
    async fn test_failing_client_ping() {
        let client = FailingDatabaseClient::new("server on fire");
        let result = client.ping().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("server on fire"));
    }
}
