//! Schema provider capability
//!
//! Anything that can produce a [`DatabaseSchema`] snapshot. The comparator
//! never depends on how a schema was produced.

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::types::DatabaseSchema;

/// Source of a schema snapshot
#[async_trait]
pub trait SchemaProvider {
    /// Build a complete schema, or fail without producing a partial one
    async fn produce_schema(&self) -> Result<DatabaseSchema>;
}
