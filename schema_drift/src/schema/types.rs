//! Type definitions for database schema objects
//!
//! Every entity is built once by a schema provider and then only read. Columns
//! and keys are kept in insertion order, but that order carries no meaning
//! when two schemas are compared beyond the per-table ordering of differences.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Name conventionally reserved for a table's primary key
pub const PRIMARY_KEY_NAME: &str = "PRIMARY";

/// Represents a complete database schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaRecord")]
pub struct DatabaseSchema {
    tables: IndexMap<String, Table>,
}

impl DatabaseSchema {
    /// Create a new empty database schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to the schema; a table with the same name already present wins
    pub fn add_table(&mut self, table: Table) -> &mut Self {
        self.tables.entry(table.name.clone()).or_insert(table);
        self
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Detach a table so it can be extended and added back
    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        self.tables.shift_remove(name)
    }

    /// Tables in insertion order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Represents a database table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRecord")]
pub struct Table {
    name: String,
    engine: Option<String>,
    columns: IndexMap<String, Column>,
    keys: IndexMap<String, Key>,
}

impl Table {
    /// Create a new table with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            engine: None,
            columns: IndexMap::new(),
            keys: IndexMap::new(),
        }
    }

    /// Set the storage engine
    pub fn with_engine(mut self, engine: Option<&str>) -> Self {
        self.set_engine(engine);
        self
    }

    pub fn set_engine(&mut self, engine: Option<&str>) -> &mut Self {
        self.engine = engine.map(str::to_string);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine(&self) -> Option<&str> {
        self.engine.as_deref()
    }

    /// Add a column to the table; a column with the same name already present wins
    pub fn add_column(&mut self, column: Column) -> &mut Self {
        self.columns.entry(column.name.clone()).or_insert(column);
        self
    }

    /// Builder form of [`Table::add_column`]
    pub fn with_column(mut self, column: Column) -> Self {
        self.add_column(column);
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Columns in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Add a key to the table; a key with the same name already present wins
    pub fn add_key(&mut self, key: Key) -> &mut Self {
        self.keys.entry(key.name.clone()).or_insert(key);
        self
    }

    /// Builder form of [`Table::add_key`]
    pub fn with_key(mut self, key: Key) -> Self {
        self.add_key(key);
        self
    }

    pub fn key(&self, name: &str) -> Option<&Key> {
        self.keys.get(name)
    }

    /// Mutable access for providers that collect key columns row by row
    pub fn key_mut(&mut self, name: &str) -> Option<&mut Key> {
        self.keys.get_mut(name)
    }

    pub fn has_key(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.values()
    }
}

/// Represents a database column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data_type: String,
    default_value: Option<String>,
    nullable: bool,
    auto_increment: bool,
}

impl Column {
    /// Create a nullable column without default value
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            default_value: None,
            nullable: true,
            auto_increment: false,
        }
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set a default value for the column
    pub fn default(self, default: &str) -> Self {
        self.with_default(Some(default.to_string()))
    }

    /// Set or clear the default value
    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default_value = default;
        self
    }

    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }
}

/// Kind of a table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Primary,
    Unique,
    Foreign,
    #[serde(alias = "key")]
    Index,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KeyKind::Primary => "primary key",
            KeyKind::Unique => "unique key",
            KeyKind::Foreign => "foreign key",
            KeyKind::Index => "index",
        };
        f.write_str(label)
    }
}

/// Represents an index or constraint over an ordered list of columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "KeyRecord")]
pub struct Key {
    kind: KeyKind,
    name: String,
    columns: Vec<String>,
}

impl Key {
    /// Create a key; at least one column is required
    pub fn new<I, S>(kind: KeyKind, name: &str, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(Error::DefinitionError(format!(
                "Key `{}` must cover at least one column",
                name
            )));
        }

        Ok(Self {
            kind,
            name: name.to_string(),
            columns,
        })
    }

    /// Primary key named `PRIMARY`
    pub fn primary<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(KeyKind::Primary, PRIMARY_KEY_NAME, columns)
    }

    /// Append a column to the end of the key
    pub fn add_column(&mut self, column: &str) -> &mut Self {
        self.columns.push(column.to_string());
        self
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

// Serialized forms; deserialization rebuilds entities through their constructors

#[derive(Deserialize)]
struct SchemaRecord {
    tables: IndexMap<String, Table>,
}

impl TryFrom<SchemaRecord> for DatabaseSchema {
    type Error = Error;

    fn try_from(record: SchemaRecord) -> Result<Self> {
        let mut schema = DatabaseSchema::new();
        for (name, table) in record.tables {
            check_entry("table", &name, table.name())?;
            schema.add_table(table);
        }
        Ok(schema)
    }
}

#[derive(Deserialize)]
struct TableRecord {
    name: String,
    engine: Option<String>,
    columns: IndexMap<String, Column>,
    keys: IndexMap<String, Key>,
}

impl TryFrom<TableRecord> for Table {
    type Error = Error;

    fn try_from(record: TableRecord) -> Result<Self> {
        let mut table = Table::new(&record.name).with_engine(record.engine.as_deref());
        for (name, column) in record.columns {
            check_entry("column", &name, column.name())?;
            table.add_column(column);
        }
        for (name, key) in record.keys {
            check_entry("key", &name, key.name())?;
            table.add_key(key);
        }
        Ok(table)
    }
}

#[derive(Deserialize)]
struct KeyRecord {
    kind: KeyKind,
    name: String,
    columns: Vec<String>,
}

impl TryFrom<KeyRecord> for Key {
    type Error = Error;

    fn try_from(record: KeyRecord) -> Result<Self> {
        Key::new(record.kind, &record.name, record.columns)
    }
}

fn check_entry(entity: &str, entry: &str, name: &str) -> Result<()> {
    if entry != name {
        return Err(Error::DefinitionError(format!(
            "{} entry `{}` holds {} `{}`",
            entity, entry, entity, name
        )));
    }
    Ok(())
}
