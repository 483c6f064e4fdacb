//! Database abstraction layer for Parley.
//!
//! Provides a trait-based interface for database operations, allowing
//! the real PostgreSQL backend and the in-memory test backends to be
//! used interchangeably.

mod mock;
mod postgres;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use postgres::PostgresClient;

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Creates a database client for the given configuration.
///
/// This is the central factory function for database connections. The
/// returned client has already completed a verification round trip.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with ParleyError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Performs a no-op round trip to verify the session is usable.
    async fn ping(&self) -> Result<()>;

    /// Lists the table names in the default schema, in catalog order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Runs a single-value count statement and returns the count.
    async fn fetch_count(&self, sql: &str) -> Result<i64>;

    /// Creates a table with the given TEXT columns if it does not exist.
    async fn ensure_table(&self, table: &str, columns: &[String]) -> Result<()>;

    /// Appends rows into a table with one bound parameter per value.
    /// Returns the number of rows inserted.
    async fn insert_rows(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<String>],
    ) -> Result<u64>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
