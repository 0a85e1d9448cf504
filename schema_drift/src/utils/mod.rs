//! Utilities for schema_drift
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use naming::{association_model_name, companion_table_name, qualify_table_name};
