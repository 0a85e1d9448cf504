//! Database schema analyzer
//!
//! This module reads the MySQL catalog (`information_schema`) of the active
//! database and turns it into a [`DatabaseSchema`].

use async_trait::async_trait;
use sqlx::FromRow;

use crate::db::connection::DatabaseConnection;
use crate::error::{Error, Result};
use crate::schema::provider::SchemaProvider;
use crate::schema::types::{Column, DatabaseSchema, Key, KeyKind, Table};

const TABLES_SQL: &str = r#"
    SELECT
        CAST(TABLE_NAME AS CHAR) AS table_name,
        CAST(ENGINE AS CHAR) AS engine
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = DATABASE()
    ORDER BY TABLE_NAME
"#;

const COLUMNS_SQL: &str = r#"
    SELECT
        CAST(TABLE_NAME AS CHAR) AS table_name,
        CAST(COLUMN_NAME AS CHAR) AS column_name,
        CAST(COLUMN_TYPE AS CHAR) AS column_type,
        CAST(IS_NULLABLE AS CHAR) AS is_nullable,
        CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
        CAST(EXTRA AS CHAR) AS extra
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE()
    ORDER BY TABLE_NAME, ORDINAL_POSITION
"#;

const CONSTRAINTS_SQL: &str = r#"
    SELECT
        CAST(t.TABLE_NAME AS CHAR) AS table_name,
        CAST(t.CONSTRAINT_NAME AS CHAR) AS constraint_name,
        CAST(t.CONSTRAINT_TYPE AS CHAR) AS constraint_type,
        CAST(k.COLUMN_NAME AS CHAR) AS column_name
    FROM information_schema.TABLE_CONSTRAINTS t
    INNER JOIN information_schema.KEY_COLUMN_USAGE k
        ON t.CONSTRAINT_NAME = k.CONSTRAINT_NAME
        AND t.TABLE_SCHEMA = k.TABLE_SCHEMA
        AND t.TABLE_NAME = k.TABLE_NAME
    WHERE t.TABLE_SCHEMA = DATABASE()
    ORDER BY t.TABLE_NAME, t.CONSTRAINT_NAME, k.ORDINAL_POSITION
"#;

const STATISTICS_SQL: &str = r#"
    SELECT
        CAST(TABLE_NAME AS CHAR) AS table_name,
        CAST(INDEX_NAME AS CHAR) AS index_name,
        CAST(COLUMN_NAME AS CHAR) AS column_name
    FROM information_schema.STATISTICS
    WHERE TABLE_SCHEMA = DATABASE()
    ORDER BY TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX
"#;

// Row types for catalog queries
#[derive(Debug, FromRow)]
struct TableRow {
    table_name: String,
    engine: Option<String>,
}

#[derive(Debug, FromRow)]
struct ColumnRow {
    table_name: String,
    column_name: String,
    column_type: String,
    is_nullable: String,
    column_default: Option<String>,
    extra: String,
}

#[derive(Debug, FromRow)]
struct ConstraintRow {
    table_name: String,
    constraint_name: String,
    constraint_type: String,
    column_name: String,
}

#[derive(Debug, FromRow)]
struct StatisticsRow {
    table_name: String,
    index_name: String,
    // NULL for functional key parts
    column_name: Option<String>,
}

/// Schema analyzer for database catalog introspection
pub struct SchemaAnalyzer {
    connection: DatabaseConnection,
}

impl SchemaAnalyzer {
    /// Create a new schema analyzer
    pub fn new(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Analyze the schema of the connection's active database
    pub async fn analyze(&self) -> Result<DatabaseSchema> {
        let pool = self.connection.pool();

        let tables = sqlx::query_as::<_, TableRow>(TABLES_SQL)
            .fetch_all(pool)
            .await?;
        let columns = sqlx::query_as::<_, ColumnRow>(COLUMNS_SQL)
            .fetch_all(pool)
            .await?;
        let constraints = sqlx::query_as::<_, ConstraintRow>(CONSTRAINTS_SQL)
            .fetch_all(pool)
            .await?;
        let statistics = sqlx::query_as::<_, StatisticsRow>(STATISTICS_SQL)
            .fetch_all(pool)
            .await?;

        let schema = build_schema(tables, columns, constraints, statistics)?;

        tracing::info!(tables = schema.len(), "Analyzed database schema");

        Ok(schema)
    }
}

#[async_trait]
impl SchemaProvider for SchemaAnalyzer {
    async fn produce_schema(&self) -> Result<DatabaseSchema> {
        self.analyze().await
    }
}

/// Fold catalog rows into a schema
fn build_schema(
    tables: Vec<TableRow>,
    columns: Vec<ColumnRow>,
    constraints: Vec<ConstraintRow>,
    statistics: Vec<StatisticsRow>,
) -> Result<DatabaseSchema> {
    let mut schema = DatabaseSchema::new();

    for row in tables {
        schema.add_table(Table::new(&row.table_name).with_engine(row.engine.as_deref()));
    }

    for row in columns {
        let column = Column::new(&row.column_name, &row.column_type)
            .nullable(row.is_nullable.eq_ignore_ascii_case("YES"))
            .with_default(row.column_default)
            .auto_increment(row.extra.contains("auto_increment"));

        known_table(&mut schema, &row.table_name)?.add_column(column);
    }

    for row in constraints {
        let table = known_table(&mut schema, &row.table_name)?;

        match table.key_mut(&row.constraint_name) {
            Some(key) => {
                key.add_column(&row.column_name);
            }
            None => {
                let kind = constraint_kind(&row.constraint_type)?;
                table.add_key(Key::new(kind, &row.constraint_name, [row.column_name])?);
            }
        }
    }

    for row in statistics {
        let Some(column_name) = row.column_name else {
            tracing::warn!(
                table = %row.table_name,
                index = %row.index_name,
                "Skipping functional key part"
            );
            continue;
        };

        let table = known_table(&mut schema, &row.table_name)?;

        match table.key_mut(&row.index_name) {
            // constraints already carry their columns
            Some(key) if key.kind() == KeyKind::Index => {
                key.add_column(&column_name);
            }
            Some(_) => {}
            None => {
                table.add_key(Key::new(KeyKind::Index, &row.index_name, [column_name])?);
            }
        }
    }

    Ok(schema)
}

fn known_table<'a>(schema: &'a mut DatabaseSchema, name: &str) -> Result<&'a mut Table> {
    schema.table_mut(name).ok_or_else(|| {
        Error::ProviderError(format!(
            "Catalog references table `{}` that is not listed in information_schema.TABLES",
            name
        ))
    })
}

/// Map an information_schema constraint type to a key kind
fn constraint_kind(constraint_type: &str) -> Result<KeyKind> {
    match constraint_type {
        "PRIMARY KEY" => Ok(KeyKind::Primary),
        "UNIQUE" => Ok(KeyKind::Unique),
        "FOREIGN KEY" => Ok(KeyKind::Foreign),
        other => Err(Error::DefinitionError(format!(
            "Unknown constraint type: {}",
            other
        ))),
    }
}
