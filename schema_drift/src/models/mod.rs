//! Models module for schema_drift
//!
//! This module handles model definitions and their explicit registration.

pub mod definition;
pub mod registry;

// Re-export key types
pub use definition::{
    AssociationDefinition, FieldDefinition, FieldType, KeyDefinition, ModelDefinition, UniqueKey,
};
pub use registry::ModelRegistry;
