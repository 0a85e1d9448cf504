//! Naming utilities for schema_drift
//!
//! Table names seen by the comparator are always fully qualified; these
//! helpers apply the configured prefix and derive conventional names.

use inflector::Inflector;

/// Prepend the table prefix to an unprefixed table name
pub fn qualify_table_name(prefix: &str, table_name: &str) -> String {
    format!("{}{}", prefix, table_name)
}

/// Name of a companion table, e.g. `product` + `lang` -> `product_lang`
pub fn companion_table_name(table_name: &str, suffix: &str) -> String {
    format!("{}_{}", table_name, suffix)
}

/// Model identifier an association points at when none is given explicitly
pub fn association_model_name(association: &str) -> String {
    association.to_pascal_case()
}
