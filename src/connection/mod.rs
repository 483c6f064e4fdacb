//! Connection management for Parley.
//!
//! Centralizes connection lifecycle for the single session handle.

pub mod manager;

pub use manager::{ActiveConnection, ConnectionManager};
