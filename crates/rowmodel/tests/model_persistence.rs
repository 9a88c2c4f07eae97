//! Persistence behavior of `Model` against a recording connection.

mod fixtures;

use fixtures::{Executed, RecordingConnection, hero_model, init_tracing};
use pretty_assertions::assert_eq;
use rowmodel::prelude::*;
use rowmodel::{QueryErrorKind, SchemaErrorKind};

#[test]
fn test_save_inserts_new_row_and_assigns_key() {
    init_tracing();
    let conn = RecordingConnection::new();
    conn.set_next_id(41);
    let mut heroes = hero_model();

    heroes.set("name", "Deadpond").unwrap();
    heroes.set("age", 28).unwrap();
    assert_eq!(heroes.save(&conn, false).unwrap(), 1);

    assert_eq!(
        conn.executed(),
        vec![Executed {
            sql: r#"INSERT INTO "heroes" ("name", "age") VALUES (?, ?);"#.to_string(),
            params: vec![Value::from("Deadpond"), Value::BigInt(28)],
        }]
    );
    assert_eq!(heroes.pk_value(), Some(&Value::BigInt(41)));
    // Flags are left for the caller to reset.
    assert!(heroes.has_modifications());
}

#[test]
fn test_declared_key_is_used_for_update_and_delete() {
    let conn = RecordingConnection::new();
    let mut users = Model::new("users");
    users.string_field("email").unwrap();
    users
        .add_field(FieldInfo::new("uid", SqlType::Text).primary_key(true))
        .unwrap();
    users.init().unwrap();

    users.set_raw(1, "u-1").unwrap();
    users.set("email", "a@example.com").unwrap();
    users.save(&conn, false).unwrap();
    users.remove(&conn).unwrap();

    let sql: Vec<String> = conn.executed().into_iter().map(|e| e.sql).collect();
    assert_eq!(
        sql,
        vec![
            r#"UPDATE "users" SET "email"=? WHERE "uid"=?;"#.to_string(),
            r#"DELETE FROM "users" WHERE "uid"=?;"#.to_string(),
        ]
    );
}

#[test]
fn test_batch_replicates_placeholder_groups_row_major() {
    let conn = RecordingConnection::new();
    conn.set_next_id(10);
    let mut heroes = hero_model();

    heroes.clear_batch();
    for (name, age) in [("A", 1), ("B", 2), ("C", 3)] {
        heroes.set("name", name).unwrap();
        heroes.set("age", age).unwrap();
        heroes.add_in_batch().unwrap();
    }
    assert_eq!(heroes.save_batch(&conn).unwrap(), 3);

    let executed = conn.last().unwrap();
    assert_eq!(
        executed.sql,
        r#"INSERT INTO "heroes" ("name", "age") VALUES (?, ?), (?, ?), (?, ?);"#
    );
    assert_eq!(
        executed.params,
        vec![
            Value::from("A"),
            Value::BigInt(1),
            Value::from("B"),
            Value::BigInt(2),
            Value::from("C"),
            Value::BigInt(3),
        ]
    );

    // Only the last generated id is known.
    assert_eq!(heroes.pk_value(), Some(&Value::BigInt(12)));
    assert_eq!(heroes.batch_len(), 3);
}

#[test]
fn test_postgres_placeholders_are_numbered_across_rows() {
    let conn = RecordingConnection::with_dialect(Dialect::Postgres);
    let mut heroes = hero_model();
    for name in ["A", "B"] {
        heroes.set("name", name).unwrap();
        heroes.add_in_batch().unwrap();
    }
    heroes.save_batch(&conn).unwrap();

    assert_eq!(
        conn.last().unwrap().sql,
        r#"INSERT INTO "heroes" ("name", "age") VALUES ($1, $2), ($3, $4);"#
    );
}

#[test]
fn test_empty_batch_executes_nothing() {
    let conn = RecordingConnection::new();
    let mut heroes = hero_model();
    assert_eq!(heroes.save_batch(&conn).unwrap(), 0);
    assert_eq!(conn.count(), 0);
}

#[test]
fn test_mismatched_batch_executes_nothing() {
    let conn = RecordingConnection::new();
    let mut heroes = hero_model();
    heroes.add_in_batch().unwrap();
    heroes.set_raw(0, 99).unwrap();
    heroes.add_in_batch().unwrap();

    let err = heroes.save_batch(&conn).unwrap_err();
    assert!(matches!(err, Error::Batch(_)));
    assert_eq!(conn.count(), 0);
}

#[test]
fn test_key_only_multi_row_batch_executes_nothing() {
    let conn = RecordingConnection::new();
    let mut counters = Model::new("counters");
    counters.init().unwrap();

    counters.add_in_batch().unwrap();
    counters.add_in_batch().unwrap();
    let err = counters.save_batch(&conn).unwrap_err();
    assert_eq!(err.schema_kind(), Some(SchemaErrorKind::NoInsertableColumns));
    assert_eq!(conn.count(), 0);
    assert!(counters.pk().unwrap().is_null());

    counters.clear_batch();
    counters.add_in_batch().unwrap();
    assert_eq!(counters.save_batch(&conn).unwrap(), 1);
    assert_eq!(
        conn.last().unwrap().sql,
        r#"INSERT INTO "counters" DEFAULT VALUES;"#
    );
}

#[test]
fn test_set_null_key_switches_save_to_insert() {
    let conn = RecordingConnection::new();
    conn.set_next_id(20);
    let mut heroes = hero_model();
    heroes.set_raw(0, 4).unwrap();
    heroes.set("name", "Clone").unwrap();

    heroes.set_null(0).unwrap();
    assert!(!heroes.is_modified(0));
    heroes.save(&conn, false).unwrap();

    assert_eq!(
        conn.last().unwrap(),
        Executed {
            sql: r#"INSERT INTO "heroes" ("name", "age") VALUES (?, ?);"#.to_string(),
            params: vec![Value::from("Clone"), Value::Null],
        }
    );
    assert_eq!(heroes.pk_value(), Some(&Value::BigInt(20)));
}

#[test]
fn test_update_lists_only_modified_fields() {
    let conn = RecordingConnection::new();
    let mut heroes = hero_model();
    heroes.set_raw(0, 7).unwrap();
    heroes.set_raw(1, "Rusty").unwrap();
    heroes.set("age", 55).unwrap();

    assert_eq!(heroes.save(&conn, false).unwrap(), 1);
    assert_eq!(
        conn.last().unwrap(),
        Executed {
            sql: r#"UPDATE "heroes" SET "age"=? WHERE "id"=?;"#.to_string(),
            params: vec![Value::BigInt(55), Value::BigInt(7)],
        }
    );
}

#[test]
fn test_update_without_modifications_is_skipped() {
    let conn = RecordingConnection::new();
    let mut heroes = hero_model();
    heroes.set_raw(0, 7).unwrap();

    assert_eq!(heroes.save(&conn, false).unwrap(), 0);
    assert_eq!(conn.count(), 0);
}

#[test]
fn test_insert_then_update_branch() {
    let conn = RecordingConnection::new();
    let mut heroes = hero_model();

    heroes.set("name", "First").unwrap();
    heroes.save(&conn, false).unwrap();
    heroes.reset_modified();
    heroes.set("name", "Second").unwrap();
    heroes.save(&conn, false).unwrap();

    let executed = conn.executed();
    assert!(executed[0].sql.starts_with("INSERT"));
    assert_eq!(
        executed[1].sql,
        r#"UPDATE "heroes" SET "name"=? WHERE "id"=?;"#
    );
    assert_eq!(executed[1].params, vec![Value::from("Second"), Value::BigInt(1)]);
}

#[test]
fn test_force_insert_includes_known_key() {
    let conn = RecordingConnection::new();
    let mut heroes = hero_model();
    heroes.set_raw(0, 500).unwrap();
    heroes.set("name", "Copy").unwrap();

    heroes.save(&conn, true).unwrap();

    let executed = conn.last().unwrap();
    assert_eq!(
        executed.sql,
        r#"INSERT INTO "heroes" ("id", "name", "age") VALUES (?, ?, ?);"#
    );
    assert_eq!(executed.params[0], Value::BigInt(500));
    assert_eq!(heroes.pk_value(), Some(&Value::BigInt(500)));
}

#[test]
fn test_failed_insert_leaves_key_null() {
    let conn = RecordingConnection::new();
    conn.fail_on("INSERT");
    let mut heroes = hero_model();
    heroes.set("name", "Doomed").unwrap();

    let err = heroes.save(&conn, false).unwrap_err();
    assert_eq!(err.query_kind(), Some(QueryErrorKind::Execute));
    assert!(heroes.pk().unwrap().is_null());
    assert_eq!(heroes.batch_len(), 1);
}

#[test]
fn test_remove_nulls_key() {
    let conn = RecordingConnection::new();
    let mut heroes = hero_model();
    heroes.set_raw(0, 3).unwrap();

    assert_eq!(heroes.remove(&conn).unwrap(), 1);
    assert_eq!(
        conn.last().unwrap(),
        Executed {
            sql: r#"DELETE FROM "heroes" WHERE "id"=?;"#.to_string(),
            params: vec![Value::BigInt(3)],
        }
    );
    assert!(heroes.pk().unwrap().is_null());
}

#[test]
fn test_remove_nulls_key_even_when_delete_fails() {
    let conn = RecordingConnection::new();
    conn.fail_on("DELETE");
    let mut heroes = hero_model();
    heroes.set_raw(0, 3).unwrap();

    let err = heroes.remove(&conn).unwrap_err();
    assert_eq!(err.query_kind(), Some(QueryErrorKind::Execute));
    assert!(heroes.pk().unwrap().is_null());

    // Saving again now takes the insert path.
    conn.stop_failing();
    heroes.set("name", "Back").unwrap();
    heroes.save(&conn, false).unwrap();
    assert!(conn.last().unwrap().sql.starts_with("INSERT"));
}

#[test]
fn test_reset_modified_is_idempotent() {
    let mut heroes = hero_model();
    heroes.set("name", "X").unwrap();
    heroes.set("age", 1).unwrap();

    heroes.reset_modified();
    let once: Vec<bool> = heroes.fields().map(|f| f.is_modified()).collect();
    heroes.reset_modified();
    let twice: Vec<bool> = heroes.fields().map(|f| f.is_modified()).collect();

    assert_eq!(once, vec![false, false, false]);
    assert_eq!(once, twice);
}

#[test]
fn test_uninitialized_model_executes_nothing() {
    let conn = RecordingConnection::new();
    let mut draft = Model::new("drafts");
    draft.string_field("title").unwrap();
    draft.set("title", "x").unwrap();

    let err = draft.save(&conn, false).unwrap_err();
    assert_eq!(err.schema_kind(), Some(SchemaErrorKind::NotInitialized));
    assert!(draft.remove(&conn).is_err());
    assert_eq!(conn.count(), 0);
}

#[test]
fn test_create_table_runs_generated_ddl() {
    let conn = RecordingConnection::new();
    let mut heroes = Model::new("heroes");
    heroes.string_field("name").unwrap();
    heroes
        .add_field(
            FieldInfo::new("team_id", SqlType::Integer).references(
                ForeignKeyInfo::new("teams", "id").on_delete(ReferentialAction::SetNull),
            ),
        )
        .unwrap();
    heroes.init().unwrap();

    heroes.create_table(&conn).unwrap();
    assert_eq!(
        conn.last().unwrap().sql,
        "CREATE TABLE \"heroes\" (\n    \"id\" INTEGER PRIMARY KEY AUTOINCREMENT,\n    \"name\" TEXT,\n    \"team_id\" INTEGER REFERENCES \"teams\"(\"id\") ON DELETE SET NULL\n);"
    );

    let fks = heroes.foreign_keys();
    assert_eq!(fks.len(), 1);
    assert_eq!(fks[0].0.name(), "team_id");
    assert!(fks[0].1.targets("teams"));
}
