//! Schema module for schema_drift
//!
//! This module holds the schema entity model, the difference taxonomy and the
//! comparator, together with the catalog-introspection provider.

pub mod analyzer;
pub mod comparator;
pub mod difference;
pub mod provider;
pub mod types;

// Re-export key types
pub use analyzer::SchemaAnalyzer;
pub use comparator::SchemaComparator;
pub use difference::Difference;
pub use provider::SchemaProvider;
pub use types::{Column, DatabaseSchema, Key, KeyKind, Table, PRIMARY_KEY_NAME};
