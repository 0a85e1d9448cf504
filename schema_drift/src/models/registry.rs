//! Model registry for schema_drift
//!
//! This module holds the explicitly registered model definitions and builds
//! the target schema they declare.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::definition::{FieldDefinition, FieldType, ModelDefinition};
use crate::schema::provider::SchemaProvider;
use crate::schema::types::{Column, DatabaseSchema, Key, KeyKind, Table};
use crate::utils::naming::{association_model_name, companion_table_name, qualify_table_name};

/// Column type of generated identifier columns
pub const ID_COLUMN_TYPE: &str = "int(11) unsigned";

const LANG_ID_COLUMN: &str = "id_lang";
const SHOP_ID_COLUMN: &str = "id_shop";

const SIZE_MAX_VARCHAR: u64 = 255;
const SIZE_TEXT: u64 = 65_535;
const SIZE_MEDIUM_TEXT: u64 = 16_777_215;

/// Registry for model definitions
///
/// Models are processed in registration order when the schema is built.
pub struct ModelRegistry {
    models: IndexMap<String, ModelDefinition>,
    table_prefix: String,
    default_engine: Option<String>,
    shop_tables: HashSet<String>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new(table_prefix: &str, default_engine: Option<&str>) -> Self {
        Self {
            models: IndexMap::new(),
            table_prefix: table_prefix.to_string(),
            default_engine: default_engine.map(str::to_string),
            shop_tables: HashSet::new(),
        }
    }

    /// Create a registry from configuration, loading every definition file
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new(
            &config.schema.table_prefix,
            config.schema.default_engine.as_deref(),
        );

        for table in &config.schema.shop_associated_tables {
            registry.associate_shop_table(table);
        }

        for path in &config.models.definition_files {
            registry.load_definitions(path)?;
        }

        Ok(registry)
    }

    /// Register a model definition under an identifier
    pub fn register(&mut self, identifier: &str, definition: ModelDefinition) -> &mut Self {
        if self
            .models
            .insert(identifier.to_string(), definition)
            .is_some()
        {
            tracing::warn!(model = identifier, "Replaced existing model definition");
        }
        self
    }

    /// Mark an unprefixed table as always having a `_shop` companion table
    pub fn associate_shop_table(&mut self, table: &str) -> &mut Self {
        self.shop_tables.insert(table.to_string());
        self
    }

    /// Load and register every definition of a YAML or TOML file
    pub fn load_definitions<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let definitions: IndexMap<String, ModelDefinition> =
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
                    Error::DefinitionError(format!("Invalid definitions in {}: {}", path.display(), e))
                })?,
                Some("toml") => toml::from_str(&content).map_err(|e| {
                    Error::DefinitionError(format!("Invalid definitions in {}: {}", path.display(), e))
                })?,
                _ => {
                    return Err(Error::ConfigError(format!(
                        "Unsupported definition file format: {}",
                        path.display()
                    )))
                }
            };

        let count = definitions.len();
        for (identifier, definition) in definitions {
            self.register(&identifier, definition);
        }

        tracing::debug!(path = %path.display(), models = count, "Loaded model definitions");

        Ok(count)
    }

    /// Get all registered models
    pub fn get_models(&self) -> &IndexMap<String, ModelDefinition> {
        &self.models
    }

    /// Get a specific model by identifier
    pub fn get_model(&self, identifier: &str) -> Option<&ModelDefinition> {
        self.models.get(identifier)
    }

    /// Convert registered models to database schema
    pub fn to_database_schema(&self) -> Result<DatabaseSchema> {
        let mut schema = DatabaseSchema::new();

        for (identifier, definition) in &self.models {
            self.process_model(&mut schema, identifier, definition)?;
        }

        tracing::info!(
            models = self.models.len(),
            tables = schema.len(),
            "Built schema from model definitions"
        );

        Ok(schema)
    }

    fn process_model(
        &self,
        schema: &mut DatabaseSchema,
        identifier: &str,
        definition: &ModelDefinition,
    ) -> Result<()> {
        let mut primary_table = self.take_table(schema, &definition.table);

        if let Some(primary) = &definition.primary {
            let data_type = definition
                .primary_key_db_type
                .as_deref()
                .unwrap_or(ID_COLUMN_TYPE);
            primary_table.add_column(
                Column::new(primary, data_type)
                    .nullable(false)
                    .auto_increment(definition.auto_increment.unwrap_or(true)),
            );
            primary_table.add_key(Key::primary([primary.as_str()])?);
        }

        let mut lang_table = if definition.multilang {
            let primary = required_primary(identifier, definition, "multilang")?;
            let mut table = self.take_table(schema, &companion_table_name(&definition.table, "lang"));
            let mut key_columns = vec![primary, LANG_ID_COLUMN];

            table.add_column(id_column(primary));
            table.add_column(id_column(LANG_ID_COLUMN));
            if definition.multilang_shop {
                table.add_column(id_column(SHOP_ID_COLUMN).default("1"));
                key_columns.push(SHOP_ID_COLUMN);
            }
            table.add_key(Key::primary(key_columns)?);

            Some(table)
        } else {
            None
        };

        let mut shop_table =
            if definition.multishop || self.shop_tables.contains(&definition.table) {
                let primary = required_primary(identifier, definition, "multishop")?;
                let mut table =
                    self.take_table(schema, &companion_table_name(&definition.table, "shop"));

                table.add_column(id_column(primary));
                table.add_column(id_column(SHOP_ID_COLUMN));
                table.add_key(Key::primary([primary, SHOP_ID_COLUMN])?);

                Some(table)
            } else {
                None
            };

        for (field_name, field) in &definition.fields {
            let column = Self::field_column(identifier, field_name, field)?;

            if let Some(lang) = lang_table.as_mut().filter(|_| field.lang) {
                lang.add_column(column);
            } else if let Some(shop) = shop_table.as_mut().filter(|_| field.shop) {
                if !field.shop_only {
                    primary_table.add_column(column.clone());
                }
                shop.add_column(column);
            } else {
                primary_table.add_column(column);
            }

            if let Some(key_name) = field.unique_key_name(field_name) {
                primary_table.add_key(Key::new(KeyKind::Unique, key_name, [field_name.as_str()])?);
            }
        }

        schema.add_table(primary_table);
        if let Some(table) = lang_table {
            schema.add_table(table);
        }
        if let Some(table) = shop_table {
            schema.add_table(table);
        }

        for (association_name, association) in &definition.associations {
            let Some(join_table_name) = association.join_table.as_deref().filter(|t| !t.is_empty())
            else {
                continue;
            };

            let source_field = match association.join_source_field.as_deref() {
                Some(field) => field,
                None => required_primary(identifier, definition, "association")?,
            };
            let target_field = match association.join_target_field.as_deref() {
                Some(field) => field.to_string(),
                None => self.association_target_primary(identifier, association_name, association.object.as_deref())?,
            };

            let mut join_table = self.take_table(schema, join_table_name);
            join_table.add_column(id_column(source_field));
            join_table.add_column(id_column(&target_field));
            schema.add_table(join_table);
        }

        for (table_name, keys) in &definition.keys {
            let qualified = qualify_table_name(&self.table_prefix, table_name);
            let table = schema.table_mut(&qualified).ok_or_else(|| {
                Error::DefinitionError(format!(
                    "Model `{}` declares keys for unknown table `{}`",
                    identifier, qualified
                ))
            })?;

            for (key_name, key) in keys {
                table.add_key(Key::new(key.kind, key_name, key.columns.iter().map(String::as_str))?);
            }
        }

        tracing::debug!(model = identifier, table = %definition.table, "Processed model definition");

        Ok(())
    }

    /// Build the column a field declares
    fn field_column(identifier: &str, field_name: &str, field: &FieldDefinition) -> Result<Column> {
        let data_type = Self::map_type_to_db_type(identifier, field_name, field)?;
        let mut column = Column::new(field_name, &data_type);

        if let Some(nullable) = field.db_nullable {
            column = column.nullable(nullable);
        } else if let Some(required) = field.required {
            column = column.nullable(!required);
        }

        let default = match &field.db_default {
            Some(db_default) => db_default.clone(),
            None => field.default.clone(),
        };

        Ok(column.with_default(default))
    }

    /// Map a field's logical type to a concrete column type
    pub fn map_type_to_db_type(
        identifier: &str,
        field_name: &str,
        field: &FieldDefinition,
    ) -> Result<String> {
        if let Some(db_type) = field.db_type.as_deref().filter(|t| !t.is_empty()) {
            return Ok(db_type.to_string());
        }

        match field.field_type {
            FieldType::Int => {
                let size = field.size.unwrap_or(11);
                let base = if size == 1 { "tinyint" } else { "int" };
                let suffix = if field.signed.unwrap_or(false) { "" } else { " unsigned" };
                Ok(format!("{}({}){}", base, size, suffix))
            }
            FieldType::Bool => Ok("tinyint(1) unsigned".to_string()),
            FieldType::String | FieldType::Html => {
                if let Some(values) = field.values.as_ref().filter(|v| !v.is_empty()) {
                    return Ok(format!("enum('{}')", values.join("','")));
                }
                let size = field.size.unwrap_or(SIZE_MAX_VARCHAR);
                let data_type = match size {
                    s if s <= SIZE_MAX_VARCHAR => format!("varchar({})", s),
                    s if s <= SIZE_TEXT => "text".to_string(),
                    s if s <= SIZE_MEDIUM_TEXT => "mediumtext".to_string(),
                    _ => "longtext".to_string(),
                };
                Ok(data_type)
            }
            FieldType::Float | FieldType::Price => Ok(format!(
                "decimal({},{})",
                field.size.unwrap_or(20),
                field.decimals.unwrap_or(6)
            )),
            FieldType::Date => Ok("datetime".to_string()),
            FieldType::Nothing | FieldType::Sql => Err(Error::DefinitionError(format!(
                "Please change type for field `{}` in model `{}`, or set a specific `db_type`",
                field_name, identifier
            ))),
        }
    }

    /// Primary column of the model an association points at
    fn association_target_primary(
        &self,
        identifier: &str,
        association_name: &str,
        object: Option<&str>,
    ) -> Result<String> {
        let target = object
            .map(str::to_string)
            .unwrap_or_else(|| association_model_name(association_name));

        let target_definition = self.get_model(&target).ok_or_else(|| {
            Error::DefinitionError(format!(
                "Association `{}` of model `{}` targets unregistered model `{}`",
                association_name, identifier, target
            ))
        })?;

        target_definition.primary.clone().ok_or_else(|| {
            Error::DefinitionError(format!(
                "Association `{}` of model `{}` targets model `{}` without primary column",
                association_name, identifier, target
            ))
        })
    }

    /// Detach an already built table, or start a new one
    fn take_table(&self, schema: &mut DatabaseSchema, table_name: &str) -> Table {
        let qualified = qualify_table_name(&self.table_prefix, table_name);
        schema.remove_table(&qualified).unwrap_or_else(|| {
            Table::new(&qualified).with_engine(self.default_engine.as_deref())
        })
    }
}

#[async_trait]
impl SchemaProvider for ModelRegistry {
    async fn produce_schema(&self) -> Result<DatabaseSchema> {
        self.to_database_schema()
    }
}

/// Not-null identifier column
fn id_column(name: &str) -> Column {
    Column::new(name, ID_COLUMN_TYPE).nullable(false)
}

fn required_primary<'a>(
    identifier: &str,
    definition: &'a ModelDefinition,
    feature: &str,
) -> Result<&'a str> {
    definition.primary.as_deref().ok_or_else(|| {
        Error::DefinitionError(format!(
            "Model `{}` uses {} but declares no primary column",
            identifier, feature
        ))
    })
}
