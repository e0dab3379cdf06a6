use jiff::Timestamp;
use postgres::Row;
use postgres_types::{private::BytesMut, to_sql_checked, IsNull, ToSql, Type};
use relmap_core::{stmt::Value, Error, Result};
use rust_decimal::Decimal;
use std::time::SystemTime;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// Binds a value as a statement parameter of whatever type the server
/// inferred for it.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub(crate) &'a Value);

impl ToSql for Param<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        match self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(value) => value.to_sql(ty, out),
            Value::I32(value) => match *ty {
                Type::INT2 => i16::try_from(*value)?.to_sql(ty, out),
                Type::INT8 => (*value as i64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*value).to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            Value::I64(value) => match *ty {
                Type::INT2 => i16::try_from(*value)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*value)?.to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*value).to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            Value::Decimal(value) => value.to_sql(ty, out),
            Value::String(value) => value.to_sql(ty, out),
            Value::Bytes(value) => value.to_sql(ty, out),
            Value::Uuid(value) => match *ty {
                Type::TEXT | Type::VARCHAR => value.to_string().to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            Value::Timestamp(value) => SystemTime::from(*value).to_sql(ty, out),
            Value::DateTimeOffset(value) => SystemTime::from(value.timestamp).to_sql(ty, out),
            value => Err(Box::new(Error::type_conversion(
                value.clone(),
                format!("PostgreSQL {ty}"),
            ))),
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Reads column `index` of `row` by its PostgreSQL type.
pub(crate) fn from_sql(row: &Row, index: usize) -> Result<Value> {
    let ty = row.columns()[index].type_().clone();

    let value = match ty {
        Type::BOOL => get::<bool>(row, index)?.into(),
        Type::INT2 => get::<i16>(row, index)?.map(i32::from).into(),
        Type::INT4 => get::<i32>(row, index)?.into(),
        Type::INT8 => get::<i64>(row, index)?.into(),
        Type::NUMERIC => get::<Decimal>(row, index)?.into(),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            get::<String>(row, index)?.into()
        }
        Type::BYTEA => get::<Vec<u8>>(row, index)?.into(),
        Type::UUID => get::<Uuid>(row, index)?.into(),
        Type::TIMESTAMP | Type::TIMESTAMPTZ => match get::<SystemTime>(row, index)? {
            Some(time) => Timestamp::try_from(time)
                .map_err(|_| Error::type_conversion(Value::Null, "Timestamp"))?
                .into(),
            None => Value::Null,
        },
        ty => {
            return Err(Error::unsupported_feature(format!(
                "column type {ty} of `{}`",
                row.columns()[index].name()
            )))
        }
    };

    Ok(value)
}

fn get<'a, T>(row: &'a Row, index: usize) -> Result<Option<T>>
where
    T: postgres_types::FromSql<'a>,
{
    row.try_get(index).map_err(Error::driver)
}
