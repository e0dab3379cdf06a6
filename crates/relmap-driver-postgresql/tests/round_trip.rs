//! Runs against a live server when `RELMAP_POSTGRESQL_URL` is set.

use jiff::Timestamp;
use pretty_assertions::assert_eq;
use relmap_core::{
    driver::{Features, Provider, SqlKeyword},
    stmt::{SqlStatement, Type, Value},
};
use relmap_driver_postgresql::PostgreSQL;
use rust_decimal::Decimal;
use uuid::Uuid;

fn provider() -> Option<PostgreSQL> {
    let url = std::env::var("RELMAP_POSTGRESQL_URL").ok()?;
    Some(PostgreSQL::open(url).unwrap())
}

#[test]
fn dialect_without_server() {
    let provider = PostgreSQL::open("postgresql://localhost/relmap").unwrap();

    assert_eq!(provider.features(), Features::ALL);
    assert_eq!(provider.create_sql_keyword(SqlKeyword::ILike), "ILIKE");

    let insert = SqlStatement::new()
        .append_sql("INSERT INTO concept (mnemonic) VALUES (")
        .arg("ACTIVE")
        .append_sql(")");
    assert_eq!(
        provider.returning(insert, &["key", "version_key"]).sql(),
        r#"INSERT INTO concept (mnemonic) VALUES (?) RETURNING "key", "version_key""#
    );

    let exists = provider.exists(SqlStatement::new().append_sql("SELECT 1"));
    assert_eq!(
        exists.sql(),
        "SELECT CASE WHEN EXISTS (SELECT 1) THEN true ELSE false END"
    );
}

#[test]
fn values_round_trip() {
    let Some(provider) = provider() else {
        return;
    };

    let mut cx = provider.write_connection().unwrap();
    cx.begin().unwrap();

    let create = provider
        .create_raw_command(
            &mut cx,
            "CREATE TEMPORARY TABLE relmap_round_trip (
                key UUID PRIMARY KEY,
                created TIMESTAMPTZ NOT NULL,
                amount NUMERIC,
                sequence BIGINT
            )",
            vec![],
        )
        .unwrap();
    cx.execute(&create).unwrap();

    let key = Uuid::new_v4();
    let created: Timestamp = "2001-09-09T01:46:40Z".parse().unwrap();
    let amount: Decimal = "19.95".parse().unwrap();

    let insert = provider
        .create_raw_command(
            &mut cx,
            "INSERT INTO relmap_round_trip (key, created, amount, sequence) VALUES (?, ?, ?, ?)",
            vec![key.into(), created.into(), amount.into(), 1.into()],
        )
        .unwrap();
    assert_eq!(insert.sql.matches('$').count(), 4);
    assert_eq!(cx.execute(&insert).unwrap(), 1);

    let select = provider
        .create_raw_command(
            &mut cx,
            "SELECT key, created, amount, sequence FROM relmap_round_trip WHERE key = ?",
            vec![key.into()],
        )
        .unwrap();
    let mut row = cx.query(&select).unwrap().remove(0);

    assert_eq!(row.take("key").unwrap(), Value::Uuid(key));
    assert_eq!(row.take("created").unwrap(), Value::Timestamp(created));
    assert_eq!(row.take("amount").unwrap(), Value::Decimal(amount));
    assert_eq!(
        provider
            .convert_value(row.take("sequence").unwrap(), &Type::I32)
            .unwrap(),
        Value::I32(1)
    );

    let count = provider.count(
        SqlStatement::new().append_sql("SELECT key FROM relmap_round_trip"),
    );
    let command = provider.create_command(&mut cx, &count).unwrap();
    assert_eq!(cx.query(&command).unwrap()[0].values, vec![Value::I64(1)]);

    cx.rollback().unwrap();
}
