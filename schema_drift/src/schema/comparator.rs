//! Schema comparator
//!
//! This module compares two database schemas and lists every difference
//! between them, in an order that depends only on the schemas' contents.

use std::collections::HashSet;

use crate::schema::difference::Difference;
use crate::schema::types::{Column, DatabaseSchema, Table};

/// Compares a current schema against a target schema
///
/// The comparator holds nothing but its ignore set, so a single instance can
/// serve any number of comparisons, including concurrent ones.
#[derive(Debug, Clone, Default)]
pub struct SchemaComparator {
    ignore_tables: HashSet<String>,
}

impl SchemaComparator {
    /// Create a comparator that skips the given fully qualified table names
    pub fn new<I, S>(ignore_tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore_tables: ignore_tables.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ignore_tables(&self) -> &HashSet<String> {
        &self.ignore_tables
    }

    /// List the differences that separate `current` from `target`
    ///
    /// Target tables are visited first, sorted by name, yielding missing
    /// tables and per-table differences. Extra tables follow, also sorted by
    /// name.
    pub fn compare<'a>(
        &self,
        current: &'a DatabaseSchema,
        target: &'a DatabaseSchema,
    ) -> Vec<Difference<'a>> {
        let mut differences = Vec::new();

        for table in self.tables(target) {
            match current.table(table.name()) {
                None => differences.push(Difference::MissingTable { table }),
                Some(current_table) => {
                    differences.extend(self.table_differences(current_table, table))
                }
            }
        }

        for table in self.tables(current) {
            if !target.has_table(table.name()) {
                differences.push(Difference::ExtraTable { table });
            }
        }

        tracing::debug!(
            current_tables = current.len(),
            target_tables = target.len(),
            differences = differences.len(),
            "Compared schemas"
        );

        differences
    }

    /// List the differences between two tables sharing a name
    pub fn table_differences<'a>(
        &self,
        current: &'a Table,
        target: &'a Table,
    ) -> Vec<Difference<'a>> {
        let mut differences = Vec::new();

        if current.engine() != target.engine() {
            differences.push(Difference::DifferentEngine {
                table: target,
                current_engine: current.engine(),
            });
        }

        for column in missing_columns(current, target) {
            differences.push(Difference::MissingColumn {
                table: target,
                column,
            });
        }

        for target_column in target.columns() {
            if let Some(current_column) = current.column(target_column.name()) {
                differences.extend(Self::column_differences(
                    target,
                    current_column,
                    target_column,
                ));
            }
        }

        for column in missing_columns(target, current) {
            differences.push(Difference::ExtraColumn {
                table: current,
                column,
            });
        }

        for key in target.keys().filter(|key| !current.has_key(key.name())) {
            differences.push(Difference::MissingKey { table: target, key });
        }

        for target_key in target.keys() {
            if let Some(current_key) = current.key(target_key.name()) {
                if current_key.kind() != target_key.kind()
                    || current_key.columns() != target_key.columns()
                {
                    differences.push(Difference::DifferentKey {
                        table: target,
                        target: target_key,
                        current: current_key,
                    });
                }
            }
        }

        for key in current.keys().filter(|key| !target.has_key(key.name())) {
            differences.push(Difference::ExtraKey {
                table: current,
                key,
            });
        }

        differences
    }

    /// List attribute differences of two columns sharing a name
    ///
    /// Every attribute is checked on its own, so a column pair yields between
    /// zero and four differences.
    pub fn column_differences<'a>(
        table: &'a Table,
        current: &'a Column,
        target: &'a Column,
    ) -> Vec<Difference<'a>> {
        let mut differences = Vec::new();

        if current.data_type() != target.data_type() {
            differences.push(Difference::DifferentDataType {
                table,
                target,
                current,
            });
        }

        if current.default_value() != target.default_value() {
            differences.push(Difference::DifferentDefaultValue {
                table,
                target,
                current,
            });
        }

        if current.is_nullable() != target.is_nullable() {
            differences.push(Difference::DifferentNullable {
                table,
                target,
                current,
            });
        }

        if current.is_auto_increment() != target.is_auto_increment() {
            differences.push(Difference::DifferentAutoIncrement {
                table,
                target,
                current,
            });
        }

        differences
    }

    /// Tables that are not ignored, sorted by name
    fn tables<'a>(&self, schema: &'a DatabaseSchema) -> Vec<&'a Table> {
        let mut tables: Vec<&Table> = schema
            .tables()
            .filter(|table| !self.ignore_tables.contains(table.name()))
            .collect();
        tables.sort_by(|a, b| a.name().cmp(b.name()));
        tables
    }
}

/// Columns of `target` that `current` lacks, in target order
fn missing_columns<'a>(
    current: &'a Table,
    target: &'a Table,
) -> impl Iterator<Item = &'a Column> + 'a {
    target
        .columns()
        .filter(move |column| !current.has_column(column.name()))
}
