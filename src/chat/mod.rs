//! Conversation layer for Parley.
//!
//! Classifies free-text questions, runs them against the active connection,
//! and keeps the append-only session log.

mod interpreter;
mod log;
mod session;

pub use interpreter::{answer, count_statement, extract_table_name, Intent};
pub use interpreter::{NOT_CONNECTED_REPLY, UNKNOWN_REPLY};
pub use log::{ChatEntry, SessionLog, Speaker};
pub use session::ChatSession;
