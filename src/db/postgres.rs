//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient`
//! trait for PostgreSQL databases using sqlx. The client holds exactly one
//! connection; there is no pool and no reconnect.

use crate::config::ConnectionConfig;
use crate::db::DatabaseClient;
use crate::error::{ParleyError, Result};
use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::Connection;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::debug;

/// PostgreSQL database client.
#[derive(Debug)]
pub struct PostgresClient {
    // None once close() has run.
    conn: Mutex<Option<PgConnection>>,
}

impl PostgresClient {
    /// Opens a connection from the given configuration and verifies it with
    /// a no-op round trip before returning.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;

        debug!("Connecting to {}", config.display_string());
        let mut conn = PgConnection::connect(&conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        sqlx::query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Successfully connected to database");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn ping(&self) -> Result<()> {
        let mut guard = self.conn.lock().await;
        let conn = open_conn(&mut guard)?;

        sqlx::query("SELECT 1")
            .execute(conn)
            .await
            .map_err(|e| ParleyError::connection(e.to_string()))?;
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut guard = self.conn.lock().await;
        let conn = open_conn(&mut guard)?;

        // No ORDER BY: names come back in whatever order the catalog yields.
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
            "#,
        )
        .fetch_all(conn)
        .await
        .map_err(|e| ParleyError::query(format!("Failed to fetch tables: {e}")))?;

        Ok(names)
    }

    async fn fetch_count(&self, sql: &str) -> Result<i64> {
        let mut guard = self.conn.lock().await;
        let conn = open_conn(&mut guard)?;

        let start = Instant::now();
        let count: i64 = sqlx::query_scalar(sql)
            .fetch_one(conn)
            .await
            .map_err(|e| ParleyError::query(format_query_error(e)))?;

        debug!("Count query took {:?}", start.elapsed());
        Ok(count)
    }

    async fn ensure_table(&self, table: &str, columns: &[String]) -> Result<()> {
        let mut guard = self.conn.lock().await;
        let conn = open_conn(&mut guard)?;

        let column_defs = columns
            .iter()
            .map(|c| format!("{} TEXT", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(table),
            column_defs
        );

        sqlx::query(&sql)
            .execute(conn)
            .await
            .map_err(|e| ParleyError::import(format!("Failed to create table {table}: {e}")))?;
        Ok(())
    }

    async fn insert_rows(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<String>],
    ) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut guard = self.conn.lock().await;
        let conn = open_conn(&mut guard)?;

        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            column_list,
            placeholders
        );

        let start = Instant::now();
        let mut inserted = 0u64;
        for row in rows {
            let mut query = sqlx::query(&sql);
            for value in row {
                query = query.bind(value.as_str());
            }
            query
                .execute(&mut *conn)
                .await
                .map_err(|e| ParleyError::import(format!("Failed to insert into {table}: {e}")))?;
            inserted += 1;
        }

        debug!("Inserted {} rows in {:?}", inserted, start.elapsed());
        Ok(inserted)
    }

    async fn close(&self) -> Result<()> {
        if let Some(conn) = self.conn.lock().await.take() {
            conn.close()
                .await
                .map_err(|e| ParleyError::connection(e.to_string()))?;
        }
        Ok(())
    }
}

/// Borrows the live connection out of the guard, erroring after close().
fn open_conn<'a>(guard: &'a mut Option<PgConnection>) -> Result<&'a mut PgConnection> {
    guard
        .as_mut()
        .ok_or_else(|| ParleyError::connection("Connection is closed"))
}

/// Double-quotes an identifier for use in DDL/DML text.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ParleyError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ParleyError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        ParleyError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        ParleyError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        ParleyError::connection(
            "Server requires SSL. Add '?sslmode=require' to connection string.".to_string(),
        )
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ParleyError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ParleyError::connection(error.to_string())
    }
}

/// Formats a query error with detail and hint if available.
fn format_query_error(error: sqlx::Error) -> String {
    let mut result = String::new();

    if let Some(db_error) = error.as_database_error() {
        result.push_str(db_error.message());

        if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
            if let Some(detail) = pg_error.detail() {
                result.push_str("\n  DETAIL: ");
                result.push_str(detail);
            }

            if let Some(hint) = pg_error.hint() {
                result.push_str("\n  HINT: ");
                result.push_str(hint);
            }
        }
    } else {
        result = error.to_string();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: Most tests require a running PostgreSQL database.
    // They are skipped unless DATABASE_URL is set.

    fn get_test_database_url() -> Option<String> {
        std::env::var("DATABASE_URL").ok()
    }

    async fn get_test_client() -> Option<PostgresClient> {
        let url = get_test_database_url()?;
        let config = ConnectionConfig::from_connection_string(&url).ok()?;
        PostgresClient::connect(&config).await.ok()
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("customers"), "\"customers\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[tokio::test]
    async fn test_connect_and_ping() {
        let Some(client) = get_test_client().await else {
            eprintln!("Skipping test: DATABASE_URL not set");
            return;
        };

        client.ping().await.unwrap();
        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_list_tables() {
        let Some(client) = get_test_client().await else {
            eprintln!("Skipping test: DATABASE_URL not set");
            return;
        };

        // Listing must succeed even on an empty database
        let tables = client.list_tables().await.unwrap();
        drop(tables);

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_count_error_for_missing_table() {
        let Some(client) = get_test_client().await else {
            eprintln!("Skipping test: DATABASE_URL not set");
            return;
        };

        let result = client
            .fetch_count("SELECT COUNT(*) FROM nonexistent_table_xyz;")
            .await;
        assert!(result.is_err());

        let error = result.unwrap_err();
        assert!(
            error.to_string().contains("nonexistent_table_xyz")
                || error.to_string().contains("does not exist")
        );

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_operations_fail_after_close() {
        let Some(client) = get_test_client().await else {
            eprintln!("Skipping test: DATABASE_URL not set");
            return;
        };

        client.close().await.unwrap();
        let result = client.ping().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("closed"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_connection_error_for_unreachable_host() {
        let config = ConnectionConfig {
            host: Some("nonexistent.invalid.host".to_string()),
            port: 5432,
            database: Some("testdb".to_string()),
            user: Some("testuser".to_string()),
            password: Some("testpass".to_string()),
        };

        let result = PostgresClient::connect(&config).await;
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, ParleyError::Connection(_)));
    }
}
