//! Error types for schema_drift

use thiserror::Error;

/// Result type for schema_drift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for schema_drift
///
/// The comparator itself never fails; every variant here originates in a
/// schema provider, the configuration layer or the surrounding plumbing.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The database catalog could not be turned into a schema
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// A model definition or catalog value that cannot be mapped
    #[error("Definition error: {0}")]
    DefinitionError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Convert Serde JSON errors to schema_drift errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert YAML errors to schema_drift errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to schema_drift errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
