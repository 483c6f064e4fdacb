//! Connection manager for the session's single database handle.

use crate::config::ConnectionConfig;
use crate::db::DatabaseClient;
use crate::error::Result;

/// An active database connection with its display label.
pub struct ActiveConnection {
    /// Display-safe description of what the client is connected to.
    pub label: String,
    /// Database client.
    pub db: Box<dyn DatabaseClient>,
}

/// Manages the at-most-one database connection held by a session.
///
/// A failed connect never disturbs the stored handle; it is replaced only
/// after the new client verified successfully.
#[derive(Default)]
pub struct ConnectionManager {
    active: Option<ActiveConnection>,
}

impl ConnectionManager {
    /// Creates a new connection manager with no active connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to a database using the given configuration.
    ///
    /// Opening and verification happen before the previous handle (if any)
    /// is touched.
    pub async fn connect(&mut self, config: &ConnectionConfig) -> Result<()> {
        let db = crate::db::connect(config).await?;
        self.replace(ActiveConnection {
            label: config.display_string(),
            db,
        })
        .await;
        Ok(())
    }

    /// Verifies an externally constructed client and installs it.
    pub async fn adopt(&mut self, db: Box<dyn DatabaseClient>, label: impl Into<String>) -> Result<()> {
        db.ping().await?;
        self.replace(ActiveConnection {
            label: label.into(),
            db,
        })
        .await;
        Ok(())
    }

    async fn replace(&mut self, conn: ActiveConnection) {
        if let Some(old) = self.active.take() {
            let _ = old.db.close().await;
        }
        self.active = Some(conn);
    }

    /// Get the active database client.
    pub fn db(&self) -> Option<&dyn DatabaseClient> {
        self.active.as_ref().map(|c| c.db.as_ref())
    }

    /// Get the label of the active connection.
    pub fn label(&self) -> Option<&str> {
        self.active.as_ref().map(|c| c.label.as_str())
    }

    /// Check if there's an active connection.
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Close the active connection.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.active.take() {
            conn.db.close().await?;
        }
        Ok(())
    }
}
