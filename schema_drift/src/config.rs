//! Configuration handling for schema_drift

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;

use crate::error::{Error, Result};
use crate::schema::comparator::SchemaComparator;
use crate::utils::naming::qualify_table_name;

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete schema_drift configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    /// Build a comparator that skips the configured ignore tables
    pub fn comparator(&self) -> SchemaComparator {
        SchemaComparator::new(self.schema.qualified_ignore_tables())
    }
}

/// Database connection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

/// Table naming and comparison behaviour
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SchemaConfig {
    /// Prepended to every table name a model definition declares
    #[serde(default)]
    pub table_prefix: String,
    /// Storage engine stamped on every declaratively built table
    pub default_engine: Option<String>,
    /// Unprefixed names of tables excluded from comparison
    #[serde(default)]
    pub ignore_tables: Vec<String>,
    /// Unprefixed names of tables that always carry a `_shop` companion
    #[serde(default)]
    pub shop_associated_tables: Vec<String>,
}

impl SchemaConfig {
    /// Ignore tables with the table prefix applied
    pub fn qualified_ignore_tables(&self) -> HashSet<String> {
        self.ignore_tables
            .iter()
            .map(|table| qualify_table_name(&self.table_prefix, table))
            .collect()
    }
}

/// Where model definitions come from
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ModelsConfig {
    /// YAML or TOML files, each mapping model identifiers to definitions
    #[serde(default)]
    pub definition_files: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub stdout: bool,
}

fn default_log_format() -> String {
    "text".to_string()
}
