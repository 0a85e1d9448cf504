//! Difference taxonomy
//!
//! Each [`Difference`] describes one discrepancy between a current and a
//! target schema. Differences borrow the entities they describe from the two
//! compared schemas and are never modified after the comparator creates them.
//! Consumers should treat a comparison result as an ordered log.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::schema::types::{Column, Key, Table};

/// One discrepancy between a current and a target schema
///
/// Variants that name a single side carry the table of that side. Attribute
/// and key changes carry the target table of the matched pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Difference<'a> {
    /// Table exists in the target but not in the current schema
    MissingTable { table: &'a Table },
    /// Table exists in the current but not in the target schema
    ExtraTable { table: &'a Table },
    DifferentEngine {
        #[serde(serialize_with = "table_name")]
        table: &'a Table,
        current_engine: Option<&'a str>,
    },
    MissingColumn {
        #[serde(serialize_with = "table_name")]
        table: &'a Table,
        column: &'a Column,
    },
    ExtraColumn {
        #[serde(serialize_with = "table_name")]
        table: &'a Table,
        column: &'a Column,
    },
    DifferentDataType {
        #[serde(serialize_with = "table_name")]
        table: &'a Table,
        target: &'a Column,
        current: &'a Column,
    },
    DifferentDefaultValue {
        #[serde(serialize_with = "table_name")]
        table: &'a Table,
        target: &'a Column,
        current: &'a Column,
    },
    DifferentNullable {
        #[serde(serialize_with = "table_name")]
        table: &'a Table,
        target: &'a Column,
        current: &'a Column,
    },
    DifferentAutoIncrement {
        #[serde(serialize_with = "table_name")]
        table: &'a Table,
        target: &'a Column,
        current: &'a Column,
    },
    MissingKey {
        #[serde(serialize_with = "table_name")]
        table: &'a Table,
        key: &'a Key,
    },
    ExtraKey {
        #[serde(serialize_with = "table_name")]
        table: &'a Table,
        key: &'a Key,
    },
    /// Same key name on both sides, but a different kind or column sequence
    DifferentKey {
        #[serde(serialize_with = "table_name")]
        table: &'a Table,
        target: &'a Key,
        current: &'a Key,
    },
}

impl<'a> Difference<'a> {
    /// The table this difference refers to
    pub fn table(&self) -> &'a Table {
        match self {
            Difference::MissingTable { table }
            | Difference::ExtraTable { table }
            | Difference::DifferentEngine { table, .. }
            | Difference::MissingColumn { table, .. }
            | Difference::ExtraColumn { table, .. }
            | Difference::DifferentDataType { table, .. }
            | Difference::DifferentDefaultValue { table, .. }
            | Difference::DifferentNullable { table, .. }
            | Difference::DifferentAutoIncrement { table, .. }
            | Difference::MissingKey { table, .. }
            | Difference::ExtraKey { table, .. }
            | Difference::DifferentKey { table, .. } => *table,
        }
    }

    pub fn table_name(&self) -> &'a str {
        self.table().name()
    }
}

fn table_name<S: Serializer>(table: &&Table, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(table.name())
}

fn or_none(value: Option<&str>) -> String {
    match value {
        Some(value) => format!("'{}'", value),
        None => "none".to_string(),
    }
}

fn nullability(nullable: bool) -> &'static str {
    if nullable {
        "NULL"
    } else {
        "NOT NULL"
    }
}

fn key_columns(key: &Key) -> String {
    key.columns().join(", ")
}

impl fmt::Display for Difference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difference::MissingTable { table } => write!(f, "missing table `{}`", table.name()),
            Difference::ExtraTable { table } => write!(f, "extra table `{}`", table.name()),
            Difference::DifferentEngine {
                table,
                current_engine,
            } => write!(
                f,
                "table `{}`: engine is {}, expected {}",
                table.name(),
                or_none(*current_engine),
                or_none(table.engine())
            ),
            Difference::MissingColumn { table, column } => write!(
                f,
                "missing column `{}`.`{}` {}",
                table.name(),
                column.name(),
                column.data_type()
            ),
            Difference::ExtraColumn { table, column } => write!(
                f,
                "extra column `{}`.`{}` {}",
                table.name(),
                column.name(),
                column.data_type()
            ),
            Difference::DifferentDataType {
                table,
                target,
                current,
            } => write!(
                f,
                "column `{}`.`{}`: data type is {}, expected {}",
                table.name(),
                target.name(),
                current.data_type(),
                target.data_type()
            ),
            Difference::DifferentDefaultValue {
                table,
                target,
                current,
            } => write!(
                f,
                "column `{}`.`{}`: default value is {}, expected {}",
                table.name(),
                target.name(),
                or_none(current.default_value()),
                or_none(target.default_value())
            ),
            Difference::DifferentNullable {
                table,
                target,
                current,
            } => write!(
                f,
                "column `{}`.`{}`: is {}, expected {}",
                table.name(),
                target.name(),
                nullability(current.is_nullable()),
                nullability(target.is_nullable())
            ),
            Difference::DifferentAutoIncrement { table, target, .. } => {
                let expectation = if target.is_auto_increment() {
                    "should be"
                } else {
                    "should not be"
                };
                write!(
                    f,
                    "column `{}`.`{}`: {} auto increment",
                    table.name(),
                    target.name(),
                    expectation
                )
            }
            Difference::MissingKey { table, key } => write!(
                f,
                "missing {} `{}` on `{}` ({})",
                key.kind(),
                key.name(),
                table.name(),
                key_columns(key)
            ),
            Difference::ExtraKey { table, key } => write!(
                f,
                "extra {} `{}` on `{}` ({})",
                key.kind(),
                key.name(),
                table.name(),
                key_columns(key)
            ),
            Difference::DifferentKey {
                table,
                target,
                current,
            } => write!(
                f,
                "key `{}` on `{}`: is {} ({}), expected {} ({})",
                target.name(),
                table.name(),
                current.kind(),
                key_columns(current),
                target.kind(),
                key_columns(target)
            ),
        }
    }
}
