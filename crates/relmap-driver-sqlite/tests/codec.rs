use jiff::{tz::Offset, Timestamp};
use pretty_assertions::assert_eq;
use relmap_core::{
    driver::Provider,
    stmt::{DateTimeOffset, Type, Value},
};
use relmap_driver_sqlite::{value, Sqlite};
use rust_decimal::Decimal;
use uuid::Uuid;

fn provider() -> Sqlite {
    Sqlite::open("sqlite::memory:").unwrap()
}

fn round_trip(provider: &Sqlite, value: Value, ty: &Type) -> Value {
    let encoded = provider.encode_value(value).unwrap();
    provider.convert_value(encoded, ty).unwrap()
}

/// The latest instant jiff represents, cut to whole microseconds.
fn far_future() -> Timestamp {
    "9999-12-30T22:00:00.999999Z".parse().unwrap()
}

fn before_epoch() -> Timestamp {
    "1899-06-15T08:30:00Z".parse().unwrap()
}

#[test]
fn uuid_round_trips() {
    let provider = provider();

    for uuid in [Uuid::nil(), Uuid::max(), Uuid::new_v4()] {
        assert_eq!(
            round_trip(&provider, uuid.into(), &Type::Uuid),
            Value::Uuid(uuid)
        );
    }
}

#[test]
fn timestamp_round_trips() {
    let provider = provider();

    for ts in [
        Timestamp::UNIX_EPOCH,
        Timestamp::MIN,
        far_future(),
        before_epoch(),
    ] {
        assert_eq!(
            round_trip(&provider, ts.into(), &Type::Timestamp),
            Value::Timestamp(ts)
        );
    }
}

#[test]
fn nanosecond_timestamps_are_refused() {
    let provider = provider();
    let ts: Timestamp = "1970-01-01T00:00:01.234567891Z".parse().unwrap();

    for value in [Value::Timestamp(ts), Value::Timestamp(Timestamp::MAX)] {
        let err = provider.encode_value(value).unwrap_err();
        assert!(err.is_type_conversion());
    }
}

#[test]
fn timestamp_is_stored_as_epoch_microseconds() {
    let ts: Timestamp = "1970-01-01T00:00:01.5Z".parse().unwrap();
    assert_eq!(value::encode(ts.into()).unwrap(), Value::I64(1_500_000));
    assert_eq!(
        value::encode(Timestamp::UNIX_EPOCH.into()).unwrap(),
        Value::I64(0)
    );
}

#[test]
fn utc_date_time_offset_round_trips() {
    let provider = provider();

    for ts in [Timestamp::UNIX_EPOCH, Timestamp::MIN, far_future()] {
        let value = Value::DateTimeOffset(DateTimeOffset::utc(ts));
        assert_eq!(
            round_trip(&provider, value.clone(), &Type::DateTimeOffset),
            value
        );
    }
}

#[test]
fn date_time_offset_keeps_its_instant() {
    let provider = provider();
    let ts: Timestamp = "2024-03-10T12:00:00Z".parse().unwrap();
    let value = Value::DateTimeOffset(DateTimeOffset::new(ts, Offset::constant(2)));

    let decoded = round_trip(&provider, value.clone(), &Type::DateTimeOffset);
    assert_eq!(decoded, value);

    let Value::DateTimeOffset(decoded) = decoded else {
        panic!("expected a DateTimeOffset");
    };
    assert_eq!(decoded.timestamp, ts);
    assert_eq!(decoded.offset, Offset::UTC);
}

#[test]
fn nullable_types_accept_null() {
    let provider = provider();

    for ty in [Type::Uuid, Type::Timestamp, Type::Decimal] {
        assert_eq!(
            round_trip(&provider, Value::Null, &Type::nullable(ty)),
            Value::Null
        );
    }
}

#[test]
fn decimal_and_bool_round_trip() {
    let provider = provider();
    let decimal: Decimal = "12345678901234567890.0001".parse().unwrap();

    assert_eq!(
        round_trip(&provider, decimal.into(), &Type::Decimal),
        Value::Decimal(decimal)
    );
    assert_eq!(
        round_trip(&provider, true.into(), &Type::Bool),
        Value::Bool(true)
    );
    assert_eq!(
        round_trip(&provider, 7i32.into(), &Type::I32),
        Value::I32(7)
    );
}
