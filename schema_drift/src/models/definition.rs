//! Model definitions
//!
//! Declarative description of an application model: its primary table,
//! optional companion tables, fields, associations and extra keys. Definitions
//! are registered explicitly with a [`ModelRegistry`](super::ModelRegistry),
//! either from code or from YAML/TOML definition files.

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer};

use crate::schema::types::KeyKind;

/// Logical field type, mapped to a concrete column type by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Bool,
    String,
    Float,
    Date,
    Html,
    /// Not backed by a column type; requires an explicit `db_type`
    Nothing,
    /// Raw SQL value; requires an explicit `db_type`
    Sql,
    Price,
}

/// Definition of one application model
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDefinition {
    /// Unprefixed name of the primary table
    pub table: String,
    /// Primary key column of the primary table
    pub primary: Option<String>,
    pub primary_key_db_type: Option<String>,
    pub auto_increment: Option<bool>,
    /// Adds a `<table>_lang` companion table
    #[serde(default)]
    pub multilang: bool,
    /// Adds `id_shop` to the lang companion table
    #[serde(default)]
    pub multilang_shop: bool,
    /// Adds a `<table>_shop` companion table
    #[serde(default)]
    pub multishop: bool,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDefinition>,
    #[serde(default)]
    pub associations: IndexMap<String, AssociationDefinition>,
    /// Extra keys, by unprefixed table name and then key name
    #[serde(default)]
    pub keys: IndexMap<String, IndexMap<String, KeyDefinition>>,
}

impl ModelDefinition {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            primary: None,
            primary_key_db_type: None,
            auto_increment: None,
            multilang: false,
            multilang_shop: false,
            multishop: false,
            fields: IndexMap::new(),
            associations: IndexMap::new(),
            keys: IndexMap::new(),
        }
    }

    pub fn primary(mut self, primary: &str) -> Self {
        self.primary = Some(primary.to_string());
        self
    }

    pub fn multilang(mut self, with_shop: bool) -> Self {
        self.multilang = true;
        self.multilang_shop = with_shop;
        self
    }

    pub fn multishop(mut self) -> Self {
        self.multishop = true;
        self
    }

    pub fn field(mut self, name: &str, field: FieldDefinition) -> Self {
        self.fields.insert(name.to_string(), field);
        self
    }

    pub fn association(mut self, name: &str, association: AssociationDefinition) -> Self {
        self.associations.insert(name.to_string(), association);
        self
    }

    pub fn key(mut self, table: &str, name: &str, key: KeyDefinition) -> Self {
        self.keys
            .entry(table.to_string())
            .or_default()
            .insert(name.to_string(), key);
        self
    }
}

/// Definition of one model field
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Concrete column type, bypassing the type mapping
    pub db_type: Option<String>,
    pub size: Option<u64>,
    pub signed: Option<bool>,
    pub decimals: Option<u32>,
    /// Enumerated values, mapped to an `enum(...)` column
    pub values: Option<Vec<String>>,
    pub required: Option<bool>,
    /// Explicit nullability, taking precedence over `required`
    pub db_nullable: Option<bool>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub default: Option<String>,
    /// Column default taking precedence over `default`; an explicit null
    /// removes the default
    #[serde(default, deserialize_with = "explicit_scalar_string")]
    pub db_default: Option<Option<String>>,
    /// Stored in the lang companion table
    #[serde(default)]
    pub lang: bool,
    /// Stored in the shop companion table
    #[serde(default)]
    pub shop: bool,
    /// With `shop`, stored only in the shop companion table
    #[serde(default)]
    pub shop_only: bool,
    pub unique: Option<UniqueKey>,
}

impl FieldDefinition {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            db_type: None,
            size: None,
            signed: None,
            decimals: None,
            values: None,
            required: None,
            db_nullable: None,
            default: None,
            db_default: None,
            lang: false,
            shop: false,
            shop_only: false,
            unique: None,
        }
    }

    pub fn db_type(mut self, db_type: &str) -> Self {
        self.db_type = Some(db_type.to_string());
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn lang(mut self) -> Self {
        self.lang = true;
        self
    }

    pub fn shop(mut self, shop_only: bool) -> Self {
        self.shop = true;
        self.shop_only = shop_only;
        self
    }

    pub fn unique(mut self, unique: UniqueKey) -> Self {
        self.unique = Some(unique);
        self
    }

    /// Name of the unique key this field declares, if any
    pub fn unique_key_name<'a>(&'a self, field_name: &'a str) -> Option<&'a str> {
        match &self.unique {
            Some(UniqueKey::Flag(true)) => Some(field_name),
            Some(UniqueKey::Name(name)) if !name.is_empty() => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Unique flag of a field: `true` names the key after the field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UniqueKey {
    Flag(bool),
    Name(String),
}

/// Association to another model, materialized as a join table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssociationDefinition {
    pub join_table: Option<String>,
    /// Source column, defaults to the model's primary column
    pub join_source_field: Option<String>,
    /// Target column, defaults to the target model's primary column
    pub join_target_field: Option<String>,
    /// Target model identifier, defaults to the association name in PascalCase
    pub object: Option<String>,
}

impl AssociationDefinition {
    pub fn join_table(table: &str) -> Self {
        Self {
            join_table: Some(table.to_string()),
            ..Self::default()
        }
    }

    pub fn object(mut self, object: &str) -> Self {
        self.object = Some(object.to_string());
        self
    }
}

/// Explicit key declared by a model
#[derive(Debug, Clone, Deserialize)]
pub struct KeyDefinition {
    #[serde(rename = "type")]
    pub kind: KeyKind,
    pub columns: Vec<String>,
}

impl KeyDefinition {
    pub fn new(kind: KeyKind, columns: &[&str]) -> Self {
        Self {
            kind,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Scalar written in a definition file, kept as its column-default text
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Column-default text of the scalar; floats must be quoted to keep their digits
    fn into_text(self) -> Result<String, String> {
        match self {
            Scalar::Bool(value) => Ok((if value { "1" } else { "0" }).to_string()),
            Scalar::Int(value) => Ok(value.to_string()),
            Scalar::Float(value) => Err(format!(
                "default `{}` is a float; quote it so its digits are kept, e.g. \"0.000000\"",
                value
            )),
            Scalar::Text(value) => Ok(value),
        }
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .transpose()
        .map_err(de::Error::custom)
}

// present-but-null must stay distinguishable from absent
fn explicit_scalar_string<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_string(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_yaml_definition() {
        let yaml = r#"
table: product
primary: id_product
multilang: true
multishop: true
fields:
  reference:
    type: string
    size: 64
    unique: true
  price:
    type: price
    required: true
    shop: true
    default: 0
  description:
    type: html
    lang: true
    db_default: null
associations:
  categories:
    join_table: category_product
keys:
  product:
    reference_supplier:
      type: key
      columns: [reference, id_supplier]
"#;

        let definition: ModelDefinition = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(definition.primary.as_deref(), Some("id_product"));
        assert!(definition.multilang && definition.multishop);

        let reference = &definition.fields["reference"];
        assert_eq!(reference.field_type, FieldType::String);
        assert_eq!(reference.unique_key_name("reference"), Some("reference"));

        let price = &definition.fields["price"];
        assert_eq!(price.default.as_deref(), Some("0"));
        assert_eq!(price.db_default, None);

        let description = &definition.fields["description"];
        assert_eq!(description.db_default, Some(None));

        assert_eq!(
            definition.associations["categories"].join_table.as_deref(),
            Some("category_product")
        );
        assert_eq!(definition.keys["product"]["reference_supplier"].kind, KeyKind::Index);
    }

    #[test]
    fn named_unique_key() {
        let field = FieldDefinition::new(FieldType::String).unique(UniqueKey::Name("email_shop".to_string()));
        assert_eq!(field.unique_key_name("email"), Some("email_shop"));

        let field = FieldDefinition::new(FieldType::String).unique(UniqueKey::Flag(false));
        assert_eq!(field.unique_key_name("email"), None);
    }
}
