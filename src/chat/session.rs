//! Session context: the one object owning connection state and chat history.

use crate::chat::{interpreter, ChatEntry, SessionLog};
use crate::config::ConnectionConfig;
use crate::connection::ConnectionManager;
use crate::db::DatabaseClient;
use crate::error::Result;

/// Explicit session context passed to each operation.
///
/// Owns the connection manager and the session log; callers hold one of
/// these for the lifetime of the interactive session.
#[derive(Default)]
pub struct ChatSession {
    connections: ConnectionManager,
    log: SessionLog,
}

impl ChatSession {
    /// Creates a new session with no connection and an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects using the given configuration.
    ///
    /// On failure any previously established connection stays in place.
    pub async fn connect(&mut self, config: &ConnectionConfig) -> Result<()> {
        self.connections.connect(config).await
    }

    /// Verifies and installs an externally constructed client.
    pub async fn adopt_client(
        &mut self,
        db: Box<dyn DatabaseClient>,
        label: impl Into<String>,
    ) -> Result<()> {
        self.connections.adopt(db, label).await
    }

    /// Asks a question: records the user entry, produces the response,
    /// records the bot entry, and returns the response.
    pub async fn ask(&mut self, text: &str) -> String {
        self.log.push(ChatEntry::user(text));
        let response = interpreter::answer(self.connections.db(), text).await;
        self.log.push(ChatEntry::bot(response.clone()));
        response
    }

    /// The active database client, if connected.
    pub fn db(&self) -> Option<&dyn DatabaseClient> {
        self.connections.db()
    }

    /// The active connection label, if connected.
    pub fn connection_label(&self) -> Option<&str> {
        self.connections.label()
    }

    /// Whether a connection has been established.
    pub fn is_connected(&self) -> bool {
        self.connections.is_connected()
    }

    /// The conversation so far.
    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Closes the active connection, if any.
    pub async fn close(&mut self) -> Result<()> {
        self.connections.close().await
    }
}
