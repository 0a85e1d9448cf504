//! Tests for the schema comparator

use pretty_assertions::assert_eq;
use rstest::*;

use schema_drift::schema::types::{Column, DatabaseSchema, Key, KeyKind, Table};
use schema_drift::{Difference, SchemaComparator};

fn users_table() -> Table {
    Table::new("users")
        .with_engine(Some("InnoDB"))
        .with_column(
            Column::new("id", "int(11) unsigned")
                .nullable(false)
                .auto_increment(true),
        )
        .with_column(Column::new("name", "varchar(255)").nullable(false))
        .with_key(Key::primary(["id"]).unwrap())
}

fn schema_of(tables: Vec<Table>) -> DatabaseSchema {
    let mut schema = DatabaseSchema::new();
    for table in tables {
        schema.add_table(table);
    }
    schema
}

fn sample_schema() -> DatabaseSchema {
    schema_of(vec![
        users_table(),
        Table::new("orders")
            .with_engine(Some("InnoDB"))
            .with_column(Column::new("id_order", "int(11) unsigned").nullable(false))
            .with_column(Column::new("id_user", "int(11) unsigned").nullable(false))
            .with_column(Column::new("total", "decimal(20,6)").default("0.000000"))
            .with_key(Key::primary(["id_order"]).unwrap())
            .with_key(Key::new(KeyKind::Index, "user", ["id_user"]).unwrap()),
        Table::new("legacy_cache").with_engine(Some("MyISAM")),
    ])
}

/// Names of the difference kinds, in order
fn kinds(differences: &[Difference<'_>]) -> Vec<String> {
    differences
        .iter()
        .map(|difference| {
            serde_json::to_value(difference).unwrap()["kind"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect()
}

#[test]
fn test_identical_schemas_have_no_differences() {
    let schema = sample_schema();
    let comparator = SchemaComparator::default();

    assert!(comparator.compare(&schema, &schema).is_empty());
    assert!(comparator.compare(&schema, &schema.clone()).is_empty());
}

#[test]
fn test_missing_table() {
    let current = DatabaseSchema::new();
    let target = schema_of(vec![users_table()]);

    let differences = SchemaComparator::default().compare(&current, &target);

    assert_eq!(
        differences,
        vec![Difference::MissingTable {
            table: target.table("users").unwrap()
        }]
    );
}

#[test]
fn test_missing_column() {
    let mut current_users = Table::new("users").with_engine(Some("InnoDB")).with_column(
        Column::new("id", "int(11) unsigned")
            .nullable(false)
            .auto_increment(true),
    );
    current_users.add_key(Key::primary(["id"]).unwrap());

    let current = schema_of(vec![current_users]);
    let target = schema_of(vec![users_table()]);

    let differences = SchemaComparator::default().compare(&current, &target);
    let users = target.table("users").unwrap();

    assert_eq!(
        differences,
        vec![Difference::MissingColumn {
            table: users,
            column: users.column("name").unwrap(),
        }]
    );
}

#[test]
fn test_changed_type_and_nullability_are_reported_in_order() {
    let current = schema_of(vec![
        users_table().with_column(Column::new("email", "varchar(100)").nullable(true))
    ]);
    let target = schema_of(vec![
        users_table().with_column(Column::new("email", "varchar(255)").nullable(false))
    ]);

    let differences = SchemaComparator::default().compare(&current, &target);

    let table = target.table("users").unwrap();
    let target_email = table.column("email").unwrap();
    let current_email = current.table("users").unwrap().column("email").unwrap();

    assert_eq!(
        differences,
        vec![
            Difference::DifferentDataType {
                table,
                target: target_email,
                current: current_email,
            },
            Difference::DifferentNullable {
                table,
                target: target_email,
                current: current_email,
            },
        ]
    );
}

#[test]
fn test_ignored_extra_table() {
    let current = schema_of(vec![users_table(), Table::new("legacy_cache")]);
    let target = schema_of(vec![users_table()]);

    let comparator = SchemaComparator::new(["legacy_cache"]);

    assert_eq!(comparator.compare(&current, &target), Vec::<Difference>::new());
}

#[test]
fn test_ignored_tables_are_invisible_in_both_directions() {
    let current = schema_of(vec![
        Table::new("audit").with_column(Column::new("id", "int(11)")),
        Table::new("stats"),
    ]);
    let target = schema_of(vec![
        Table::new("audit")
            .with_engine(Some("InnoDB"))
            .with_column(Column::new("id", "bigint(20)"))
            .with_column(Column::new("payload", "text")),
        Table::new("sessions"),
    ]);

    let comparator = SchemaComparator::new(["audit", "stats", "sessions"]);
    let differences = comparator.compare(&current, &target);

    assert!(differences.is_empty());
    assert!(comparator.ignore_tables().contains("audit"));
}

#[test]
fn test_table_symmetry() {
    let current = schema_of(vec![Table::new("only_current"), Table::new("shared")]);
    let target = schema_of(vec![Table::new("only_target"), Table::new("shared")]);

    let differences = SchemaComparator::default().compare(&current, &target);

    assert_eq!(kinds(&differences), ["missing_table", "extra_table"]);
    assert_eq!(differences[0].table_name(), "only_target");
    assert_eq!(differences[1].table_name(), "only_current");
}

#[test]
fn test_output_is_independent_of_table_insertion_order() {
    let tables = || {
        vec![
            Table::new("zeta").with_column(Column::new("a", "int(11)")),
            Table::new("alpha").with_column(Column::new("b", "int(11)")),
            Table::new("Mid").with_column(Column::new("c", "int(11)")),
            Table::new("mid"),
        ]
    };

    let current = schema_of(vec![Table::new("zeta"), Table::new("stale"), Table::new("Mid")]);
    let target_forward = schema_of(tables());
    let target_reversed = schema_of(tables().into_iter().rev().collect());

    let comparator = SchemaComparator::default();
    let forward = comparator.compare(&current, &target_forward);
    let reversed = comparator.compare(&current, &target_reversed);

    let render = |differences: &[Difference<'_>]| serde_json::to_string(differences).unwrap();
    assert_eq!(render(&forward), render(&reversed));

    let tables: Vec<&str> = forward.iter().map(Difference::table_name).collect();
    assert_eq!(tables, ["Mid", "alpha", "mid", "zeta", "stale"]);
    assert_eq!(
        kinds(&forward),
        ["missing_column", "missing_table", "missing_table", "missing_column", "extra_table"]
    );
}

#[rstest]
#[case::data_type(Column::new("c", "int(10)"), "different_data_type")]
#[case::default_value(Column::new("c", "int(11)").default("0"), "different_default_value")]
#[case::nullable(Column::new("c", "int(11)").nullable(false), "different_nullable")]
#[case::auto_increment(Column::new("c", "int(11)").auto_increment(true), "different_auto_increment")]
fn test_single_attribute_mismatch(#[case] target_column: Column, #[case] expected: &str) {
    let current = schema_of(vec![Table::new("t").with_column(Column::new("c", "int(11)"))]);
    let target = schema_of(vec![Table::new("t").with_column(target_column)]);

    let differences = SchemaComparator::default().compare(&current, &target);

    assert_eq!(kinds(&differences), [expected]);
}

#[test]
fn test_column_with_every_attribute_changed() {
    let current_column = Column::new("c", "int(11)");
    let target_column = Column::new("c", "bigint(20)")
        .default("1")
        .nullable(false)
        .auto_increment(true);

    let table = Table::new("t");
    let differences = SchemaComparator::column_differences(&table, &current_column, &target_column);

    assert_eq!(
        kinds(&differences),
        [
            "different_data_type",
            "different_default_value",
            "different_nullable",
            "different_auto_increment"
        ]
    );
}

#[test]
fn test_empty_default_is_not_missing_default() {
    let current = schema_of(vec![Table::new("t").with_column(Column::new("c", "varchar(8)"))]);
    let target = schema_of(vec![Table::new("t").with_column(Column::new("c", "varchar(8)").default(""))]);

    let differences = SchemaComparator::default().compare(&current, &target);

    assert_eq!(kinds(&differences), ["different_default_value"]);
}

#[rstest]
#[case(None, Some(""))]
#[case(Some("MyISAM"), Some("InnoDB"))]
#[case(Some("InnoDB"), None)]
fn test_engine_mismatch(#[case] current_engine: Option<&str>, #[case] target_engine: Option<&str>) {
    let current = schema_of(vec![Table::new("t").with_engine(current_engine)]);
    let target = schema_of(vec![Table::new("t").with_engine(target_engine)]);

    let differences = SchemaComparator::default().compare(&current, &target);

    assert_eq!(
        differences,
        vec![Difference::DifferentEngine {
            table: target.table("t").unwrap(),
            current_engine,
        }]
    );
}

#[test]
fn test_key_column_order_matters() {
    let current = schema_of(vec![Table::new("t")
        .with_key(Key::new(KeyKind::Index, "pair", ["a", "b"]).unwrap())]);
    let target = schema_of(vec![Table::new("t")
        .with_key(Key::new(KeyKind::Index, "pair", ["b", "a"]).unwrap())]);

    let differences = SchemaComparator::default().compare(&current, &target);
    let target_table = target.table("t").unwrap();

    assert_eq!(
        differences,
        vec![Difference::DifferentKey {
            table: target_table,
            target: target_table.key("pair").unwrap(),
            current: current.table("t").unwrap().key("pair").unwrap(),
        }]
    );
}

#[test]
fn test_key_kind_change() {
    let current = schema_of(vec![Table::new("t")
        .with_key(Key::new(KeyKind::Index, "email", ["email"]).unwrap())]);
    let target = schema_of(vec![Table::new("t")
        .with_key(Key::new(KeyKind::Unique, "email", ["email"]).unwrap())]);

    let differences = SchemaComparator::default().compare(&current, &target);

    assert_eq!(kinds(&differences), ["different_key"]);
}

#[test]
fn test_renamed_column_is_not_reinterpreted() {
    let current = schema_of(vec![Table::new("t").with_column(Column::new("mail", "varchar(255)"))]);
    let target = schema_of(vec![Table::new("t").with_column(Column::new("email", "varchar(255)"))]);

    let differences = SchemaComparator::default().compare(&current, &target);

    assert_eq!(kinds(&differences), ["missing_column", "extra_column"]);
}

#[test]
fn test_table_level_differences_follow_fixed_order() {
    let current = schema_of(vec![Table::new("t")
        .with_engine(Some("MyISAM"))
        .with_column(Column::new("extra_a", "int(11)"))
        .with_column(Column::new("shared", "int(11)"))
        .with_column(Column::new("extra_b", "int(11)"))
        .with_key(Key::new(KeyKind::Index, "old_idx", ["extra_a"]).unwrap())
        .with_key(Key::new(KeyKind::Index, "shared_idx", ["shared", "extra_a"]).unwrap())]);
    let target = schema_of(vec![Table::new("t")
        .with_engine(Some("InnoDB"))
        .with_column(Column::new("new_b", "int(11)"))
        .with_column(Column::new("shared", "bigint(20)"))
        .with_column(Column::new("new_a", "int(11)"))
        .with_key(Key::new(KeyKind::Unique, "new_idx", ["new_a"]).unwrap())
        .with_key(Key::new(KeyKind::Index, "shared_idx", ["shared"]).unwrap())]);

    let differences = SchemaComparator::default().compare(&current, &target);

    assert_eq!(
        kinds(&differences),
        [
            "different_engine",
            "missing_column",
            "missing_column",
            "different_data_type",
            "extra_column",
            "extra_column",
            "missing_key",
            "different_key",
            "extra_key",
        ]
    );

    let rendered: Vec<String> = differences.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        [
            "table `t`: engine is 'MyISAM', expected 'InnoDB'",
            "missing column `t`.`new_b` int(11)",
            "missing column `t`.`new_a` int(11)",
            "column `t`.`shared`: data type is int(11), expected bigint(20)",
            "extra column `t`.`extra_a` int(11)",
            "extra column `t`.`extra_b` int(11)",
            "missing unique key `new_idx` on `t` (new_a)",
            "key `shared_idx` on `t`: is index (shared, extra_a), expected index (shared)",
            "extra index `old_idx` on `t` (extra_a)",
        ]
    );
}

#[test]
fn test_schema_is_reusable_on_both_sides() {
    let a = sample_schema();
    let b = schema_of(vec![users_table()]);
    let comparator = SchemaComparator::default();

    let forward = comparator.compare(&a, &b);
    let backward = comparator.compare(&b, &a);

    assert_eq!(kinds(&forward), ["extra_table", "extra_table"]);
    assert_eq!(kinds(&backward), ["missing_table", "missing_table"]);
    assert_eq!(forward[0].table_name(), "legacy_cache");
    assert_eq!(forward[1].table_name(), "orders");
}
