//! Database module for schema_drift
//!
//! This module handles database connections.

pub mod connection;

// Re-export key types
pub use connection::DatabaseConnection;
