use jiff::Timestamp;
use pretty_assertions::assert_eq;
use relmap_core::{
    driver::{Features, Provider, SqlKeyword},
    stmt::{SqlStatement, Type, Value},
    DataContext,
};
use relmap_driver_sqlite::{Database, Sqlite};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};
use tempfile::TempDir;
use uuid::Uuid;

struct Fixture {
    _dir: TempDir,
    provider: Sqlite,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("relmap.db").display());
    let provider = Sqlite::open(url).unwrap();

    let mut cx = provider.write_connection().unwrap();
    exec(
        &provider,
        &mut cx,
        "CREATE TABLE concept (key BLOB PRIMARY KEY, mnemonic TEXT NOT NULL, created INTEGER)",
        vec![],
    );

    Fixture {
        _dir: dir,
        provider,
    }
}

fn exec(provider: &Sqlite, cx: &mut DataContext, sql: &str, params: Vec<Value>) -> u64 {
    let command = provider.create_raw_command(cx, sql, params).unwrap();
    cx.execute(&command).unwrap()
}

fn insert_concept(provider: &Sqlite, cx: &mut DataContext, mnemonic: &str) -> Uuid {
    let key = Uuid::new_v4();
    exec(
        provider,
        cx,
        "INSERT INTO concept (key, mnemonic, created) VALUES (?, ?, ?)",
        vec![key.into(), mnemonic.into(), Timestamp::UNIX_EPOCH.into()],
    );
    key
}

fn select_concepts() -> SqlStatement {
    SqlStatement::new().append_sql("SELECT key FROM concept")
}

#[test]
fn parses_connection_urls() {
    assert_eq!(
        Database::parse("sqlite::memory:").unwrap(),
        Database::InMemory
    );
    assert_eq!(
        Database::parse("sqlite:/var/lib/relmap.db").unwrap(),
        Database::File("/var/lib/relmap.db".into())
    );
    assert!(Database::parse("postgresql://localhost/db")
        .unwrap_err()
        .is_invalid_connection_url());
    assert!(Database::parse("not a url")
        .unwrap_err()
        .is_invalid_connection_url());
}

#[test]
fn values_round_trip_through_the_database() {
    let Fixture { _dir, provider } = fixture();
    let mut cx = provider.write_connection().unwrap();
    let key = insert_concept(&provider, &mut cx, "ACTIVE");

    let command = provider
        .create_raw_command(
            &mut cx,
            "SELECT key, mnemonic, created FROM concept WHERE key = ?",
            vec![key.into()],
        )
        .unwrap();
    let mut rows = cx.query(&command).unwrap();
    assert_eq!(rows.len(), 1);

    let row = &mut rows[0];
    let read = |row: &mut relmap_core::driver::Row, column: &str, ty: &Type| {
        provider
            .convert_value(row.take(column).unwrap(), ty)
            .unwrap()
    };

    assert_eq!(read(row, "key", &Type::Uuid), Value::Uuid(key));
    assert_eq!(read(row, "mnemonic", &Type::String), Value::from("ACTIVE"));
    assert_eq!(
        read(row, "created", &Type::Timestamp),
        Value::Timestamp(Timestamp::UNIX_EPOCH)
    );
}

#[test]
fn count_yields_number_of_rows() {
    let Fixture { _dir, provider } = fixture();
    let mut cx = provider.write_connection().unwrap();

    for mnemonic in ["ACTIVE", "NULLIFIED", "OBSOLETE"] {
        insert_concept(&provider, &mut cx, mnemonic);
    }

    let count = provider.count(select_concepts());
    let command = provider.create_command(&mut cx, &count).unwrap();
    let rows = cx.query(&command).unwrap();

    assert_eq!(rows[0].values, vec![Value::I64(3)]);
}

#[test]
fn exists_is_a_standalone_statement() {
    let Fixture { _dir, provider } = fixture();
    let mut cx = provider.write_connection().unwrap();

    let exists = |cx: &mut DataContext| {
        let stmt = provider.exists(
            select_concepts()
                .append_sql(" WHERE mnemonic = ")
                .arg("ACTIVE"),
        );
        let command = provider.create_command(cx, &stmt).unwrap();
        let value = cx.query(&command).unwrap().remove(0).values.remove(0);
        provider.convert_value(value, &Type::Bool).unwrap()
    };

    assert_eq!(exists(&mut cx), Value::Bool(false));
    insert_concept(&provider, &mut cx, "ACTIVE");
    assert_eq!(exists(&mut cx), Value::Bool(true));
}

#[test]
fn like_ignores_ascii_case() {
    let Fixture { _dir, provider } = fixture();
    let mut cx = provider.write_connection().unwrap();
    insert_concept(&provider, &mut cx, "Active");

    let matches = |cx: &mut DataContext, pattern: &str| {
        let stmt = provider.count(
            select_concepts()
                .append_sql(" WHERE mnemonic ")
                .append_sql(provider.create_sql_keyword(SqlKeyword::Like))
                .append_sql(" ")
                .arg(pattern),
        );
        let command = provider.create_command(cx, &stmt).unwrap();
        cx.query(&command).unwrap().remove(0).values.remove(0)
    };

    assert_eq!(matches(&mut cx, "act%"), Value::I64(1));
    assert_eq!(matches(&mut cx, "ACTIVE"), Value::I64(1));
    assert_eq!(matches(&mut cx, "inactive"), Value::I64(0));
}

#[test]
fn read_only_context_sees_committed_writes() {
    let Fixture { _dir, provider } = fixture();

    let mut writer = provider.write_connection().unwrap();
    writer.begin().unwrap();
    insert_concept(&provider, &mut writer, "ACTIVE");
    writer.commit().unwrap();

    let mut reader = provider.readonly_connection().unwrap();
    assert!(reader.is_read_only());

    let command = provider
        .create_command(&mut reader, &select_concepts())
        .unwrap();
    assert_eq!(reader.query(&command).unwrap().len(), 1);
}

#[test]
fn dropped_context_rolls_back() {
    let Fixture { _dir, provider } = fixture();

    {
        let mut cx = provider.write_connection().unwrap();
        cx.begin().unwrap();
        insert_concept(&provider, &mut cx, "ACTIVE");
    }

    let mut cx = provider.readonly_connection().unwrap();
    let command = provider.create_command(&mut cx, &select_concepts()).unwrap();
    assert!(cx.query(&command).unwrap().is_empty());
}

#[test]
fn sqlite_dialect() {
    let provider = Sqlite::open("sqlite::memory:").unwrap();

    assert_eq!(provider.features(), Features::NONE);
    assert_eq!(provider.create_sql_keyword(SqlKeyword::ILike), "LIKE");
    assert_eq!(provider.create_sql_keyword(SqlKeyword::Lower), "LOWER");

    let insert = SqlStatement::new().append_sql("INSERT INTO concept DEFAULT VALUES");
    assert_eq!(
        provider.returning(insert.clone(), &["key"]),
        insert
    );

    let mut cx = provider.write_connection().unwrap();
    let err = provider
        .create_stored_procedure_command(&mut cx, "sp_merge", vec![])
        .unwrap_err();
    assert!(err.is_unsupported_feature());
}

#[test]
fn placeholders_become_numbered() {
    let provider = Sqlite::open("sqlite::memory:").unwrap();
    let mut cx = provider.write_connection().unwrap();

    let command = provider
        .create_raw_command(&mut cx, "SELECT ? + ?", vec![1.into(), 2.into()])
        .unwrap();

    assert_eq!(command.sql, "SELECT ?1 + ?2");
    assert_eq!(command.params, vec![Value::I64(1), Value::I64(2)]);
}

#[test]
fn writers_on_one_database_are_serialized() {
    let Fixture { _dir, provider } = fixture();
    let provider = Arc::new(provider);
    let inside = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let provider = provider.clone();
            let inside = inside.clone();

            thread::spawn(move || {
                let mut cx = provider.write_connection().unwrap();

                for j in 0..10 {
                    let token = provider.lock(&cx);
                    assert!(token.is_held());
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);

                    insert_concept(&provider, &mut cx, &format!("C{i}-{j}"));

                    inside.fetch_sub(1, Ordering::SeqCst);
                    drop(token);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let mut cx = provider.readonly_connection().unwrap();
    let count = provider.count(select_concepts());
    let command = provider.create_command(&mut cx, &count).unwrap();
    assert_eq!(cx.query(&command).unwrap()[0].values, vec![Value::I64(40)]);
}
