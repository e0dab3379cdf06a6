mod support;

use pretty_assertions::assert_eq;
use relmap_core::{
    driver::{CommandKind, Provider},
    stmt::{SqlStatement, Value},
};
use relmap_sql::Flavor;
use support::Dialect;

#[test]
fn placeholders_are_rewritten_per_flavor() {
    let stmt = SqlStatement::new()
        .append_sql("SELECT * FROM t WHERE a = ")
        .arg(1i64)
        .append_sql(" AND b = ")
        .arg("x");

    let postgres = Dialect::new(Flavor::Postgresql);
    let mut cx = postgres.context();
    let command = postgres.create_command(&mut cx, &stmt).unwrap();
    assert_eq!(command.sql, "SELECT * FROM t WHERE a = $1 AND b = $2");
    assert_eq!(command.params, vec![Value::I64(1), Value::from("x")]);
    assert_eq!(command.kind, CommandKind::Text);

    let sqlite = Dialect::new(Flavor::Sqlite);
    let mut cx = sqlite.context();
    let command = sqlite.create_command(&mut cx, &stmt).unwrap();
    assert_eq!(command.sql, "SELECT * FROM t WHERE a = ?1 AND b = ?2");
}

#[test]
fn argument_count_must_match_placeholders() {
    let dialect = Dialect::new(Flavor::Sqlite);
    let mut cx = dialect.context();

    let err = dialect
        .create_raw_command(&mut cx, "SELECT ? + ?", vec![1i64.into()])
        .unwrap_err();
    assert!(err.is_argument_count_mismatch());

    let err = dialect
        .create_raw_command(&mut cx, "SELECT 1", vec![1i64.into()])
        .unwrap_err();
    assert!(err.is_argument_count_mismatch());

    dialect
        .create_raw_command(&mut cx, "SELECT '?', ?", vec![1i64.into()])
        .unwrap();
}

#[test]
fn prepared_command_is_rebound() {
    let dialect = Dialect::new(Flavor::Postgresql);
    let mut cx = dialect.context();

    let first = dialect
        .create_raw_command(&mut cx, "SELECT * FROM t WHERE k = ?", vec![1i64.into()])
        .unwrap();
    let second = dialect
        .create_raw_command(&mut cx, "SELECT * FROM t WHERE k = ?", vec![2i64.into()])
        .unwrap();

    assert_eq!(first.sql, second.sql);
    assert_eq!(second.params, vec![Value::I64(2)]);
    assert_eq!(cx.prepared_command_count(), 1);

    let err = dialect
        .create_raw_command(&mut cx, "SELECT * FROM t WHERE k = ?", vec![])
        .unwrap_err();
    assert!(err.is_argument_count_mismatch());
}

#[test]
fn rewritten_text_is_shared_between_contexts() {
    let dialect = Dialect::new(Flavor::Sqlite);

    for _ in 0..3 {
        let mut cx = dialect.context();
        dialect
            .create_raw_command(&mut cx, "DELETE FROM t WHERE k = ?", vec![1i64.into()])
            .unwrap();
    }

    assert_eq!(dialect.statements.len(), 1);
}

#[test]
fn count_wraps_statement() {
    let dialect = Dialect::new(Flavor::Sqlite);
    let inner = SqlStatement::new().append_sql("SELECT k FROM t WHERE a = ").arg(1i64);

    let built = dialect.count(inner).build();
    assert_eq!(built.sql, "SELECT COUNT(*) FROM (SELECT k FROM t WHERE a = ?) AS Q0");
    assert_eq!(built.args, vec![Value::I64(1)]);
}
