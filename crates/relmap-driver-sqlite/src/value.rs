//! Conversion between relmap values and what SQLite stores.
//!
//! SQLite has no uuid, timestamp or decimal storage class. Uuids are stored
//! as their 16 bytes, instants as microseconds since the Unix epoch and
//! decimals as text. Instants finer than a microsecond are refused rather
//! than rounded. Offsets of `DateTimeOffset` values are not stored: they
//! read back in UTC, denoting the same instant.

use jiff::Timestamp;
use relmap_core::{
    stmt::{DateTimeOffset, Type, Value},
    Error, Result,
};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Turns a value into its stored representation.
pub fn encode(value: Value) -> Result<Value> {
    Ok(match value {
        Value::Bool(v) => Value::I64(v as i64),
        Value::I32(v) => Value::I64(v.into()),
        Value::Uuid(v) => Value::Bytes(v.as_bytes().to_vec()),
        Value::Timestamp(v) => Value::I64(microseconds(v)?),
        Value::DateTimeOffset(v) => Value::I64(microseconds(v.timestamp)?),
        Value::Decimal(v) => Value::String(v.to_string()),
        Value::Record(_) | Value::List(_) => {
            return Err(Error::type_conversion(value, "SQLite value"))
        }
        value => value,
    })
}

/// Turns a stored value back into a value of `ty`.
pub fn decode(value: Value, ty: &Type) -> Result<Value> {
    Ok(match (value, ty.non_nullable()) {
        (Value::Null, _) => Value::Null,
        (Value::I64(v), Type::Bool) => Value::Bool(v != 0),
        (Value::Bytes(v), Type::Uuid) => match Uuid::from_slice(&v) {
            Ok(uuid) => Value::Uuid(uuid),
            Err(_) => return Err(Error::type_conversion(Value::Bytes(v), "Uuid")),
        },
        (Value::I64(v), Type::Timestamp) => Value::Timestamp(timestamp(v)?),
        (Value::I64(v), Type::DateTimeOffset) => {
            Value::DateTimeOffset(DateTimeOffset::utc(timestamp(v)?))
        }
        (Value::String(v), Type::Decimal) => match v.parse::<Decimal>() {
            Ok(decimal) => Value::Decimal(decimal),
            Err(_) => return Err(Error::type_conversion(Value::String(v), "Decimal")),
        },
        (value, _) => value.cast(ty)?,
    })
}

/// Reads a column value as SQLite returned it.
pub fn from_sql(value: ValueRef<'_>) -> Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::I64(v),
        ValueRef::Real(v) => match Decimal::try_from(v) {
            Ok(decimal) => Value::Decimal(decimal),
            Err(_) => return Err(Error::type_conversion(Value::String(v.to_string()), "Decimal")),
        },
        ValueRef::Text(v) => Value::String(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::Bytes(v.to_vec()),
    })
}

const MICROS_PER_SECOND: i64 = 1_000_000;

fn microseconds(ts: Timestamp) -> Result<i64> {
    if ts.subsec_nanosecond() % 1_000 != 0 {
        return Err(Error::type_conversion(
            Value::Timestamp(ts),
            "SQLite timestamp (microsecond precision)",
        ));
    }

    Ok(ts.as_microsecond())
}

fn timestamp(micros: i64) -> Result<Timestamp> {
    let seconds = micros.div_euclid(MICROS_PER_SECOND);
    let nanos = micros.rem_euclid(MICROS_PER_SECOND) * 1_000;

    i32::try_from(nanos)
        .ok()
        .and_then(|nanos| Timestamp::new(seconds, nanos).ok())
        .ok_or_else(|| Error::type_conversion(Value::I64(micros), "Timestamp"))
}

/// Binds an encoded value as a statement parameter.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub(crate) &'a Value);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(v) => ToSqlOutput::Owned(SqlValue::Integer(*v as i64)),
            Value::I32(v) => ToSqlOutput::Owned(SqlValue::Integer(*v as i64)),
            Value::I64(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Value::String(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Value::Bytes(v) => ToSqlOutput::Borrowed(ValueRef::Blob(&v[..])),
            value => {
                let encoded = encode(value.clone())
                    .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;

                ToSqlOutput::Owned(match encoded {
                    Value::I64(v) => SqlValue::Integer(v),
                    Value::String(v) => SqlValue::Text(v),
                    Value::Bytes(v) => SqlValue::Blob(v),
                    value => {
                        return Err(rusqlite::Error::ToSqlConversionFailure(Box::new(
                            Error::type_conversion(value, "SQLite value"),
                        )))
                    }
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_is_sixteen_bytes() {
        let uuid = Uuid::from_u128(0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10);
        let Value::Bytes(bytes) = encode(uuid.into()).unwrap() else {
            panic!("uuid should encode to bytes");
        };

        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes[15], 0x10);
    }

    #[test]
    fn short_blob_is_not_a_uuid() {
        let err = decode(Value::Bytes(vec![1, 2, 3]), &Type::Uuid).unwrap_err();
        assert!(err.is_type_conversion());
    }

    #[test]
    fn null_decodes_for_any_type() {
        assert_eq!(
            decode(Value::Null, &Type::nullable(Type::Uuid)).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn sub_microsecond_instants_are_refused() {
        let ts: Timestamp = "1970-01-01T00:00:01.234567891Z".parse().unwrap();

        let err = encode(ts.into()).unwrap_err();
        assert!(err.is_type_conversion());

        let err = encode(DateTimeOffset::utc(ts).into()).unwrap_err();
        assert!(err.is_type_conversion());
    }

    #[test]
    fn microseconds_before_the_epoch_split_downwards() {
        let ts: Timestamp = "1969-12-31T23:59:59.75Z".parse().unwrap();

        assert_eq!(encode(ts.into()).unwrap(), Value::I64(-250_000));
        assert_eq!(decode(Value::I64(-250_000), &Type::Timestamp).unwrap(), Value::Timestamp(ts));
    }

    #[test]
    fn records_are_not_stored() {
        let err = encode(relmap_core::stmt::Record::new("PatientRow").into()).unwrap_err();
        assert!(err.is_type_conversion());
    }
}
