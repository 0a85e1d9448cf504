//! schema_drift: compares the schema your models declare with the one your database has
//!
//! Two schema providers produce snapshots, one from the live MySQL catalog and
//! one from registered model definitions. The comparator turns a pair of
//! snapshots into an ordered list of typed differences that a migration
//! generator can consume.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod schema;
pub mod utils;

// Re-export main types for easier access
pub use config::Config;
pub use db::connection::DatabaseConnection;
pub use error::{Error, Result};
pub use models::registry::ModelRegistry;
pub use schema::analyzer::SchemaAnalyzer;
pub use schema::comparator::SchemaComparator;
pub use schema::difference::Difference;
pub use schema::provider::SchemaProvider;
pub use schema::types::DatabaseSchema;

/// Initialize schema_drift with the specified configuration file
pub async fn init(config_path: &str) -> Result<SchemaDriftClient> {
    let config = config::load_from_file(config_path)?;
    SchemaDriftClient::new(config).await
}

/// The main client for comparing models against the database
pub struct SchemaDriftClient {
    config: Config,
    model_registry: ModelRegistry,
    schema_analyzer: SchemaAnalyzer,
    comparator: SchemaComparator,
}

impl SchemaDriftClient {
    /// Create a new client from configuration
    pub async fn new(config: Config) -> Result<Self> {
        let db_connection = DatabaseConnection::connect(&config.database).await?;
        let model_registry = ModelRegistry::from_config(&config)?;
        let schema_analyzer = SchemaAnalyzer::new(db_connection);
        let comparator = config.comparator();

        Ok(Self {
            config,
            model_registry,
            schema_analyzer,
            comparator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registry holding the loaded model definitions
    pub fn model_registry_mut(&mut self) -> &mut ModelRegistry {
        &mut self.model_registry
    }

    /// Analyze the current database schema
    pub async fn analyze_database_schema(&self) -> Result<DatabaseSchema> {
        self.schema_analyzer.produce_schema().await
    }

    /// Build the schema the registered models declare
    pub async fn model_schema(&self) -> Result<DatabaseSchema> {
        self.model_registry.produce_schema().await
    }

    /// Produce the current and the target schema
    ///
    /// Fails as soon as either provider fails, so a partial schema is never compared.
    pub async fn load_schemas(&self) -> Result<(DatabaseSchema, DatabaseSchema)> {
        let target = self.model_schema().await?;
        let current = self.analyze_database_schema().await?;
        Ok((current, target))
    }

    /// Compare the current schema against the target schema
    pub fn compare<'a>(
        &self,
        current: &'a DatabaseSchema,
        target: &'a DatabaseSchema,
    ) -> Vec<Difference<'a>> {
        let differences = self.comparator.compare(current, target);

        if differences.is_empty() {
            tracing::info!("Database schema is in sync with models");
        } else {
            tracing::info!(differences = differences.len(), "Database schema differs from models");
        }

        differences
    }
}
