use super::{Record, Type};
use crate::{Error, Result};

use jiff::{tz::Offset, Timestamp};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use std::cmp::Ordering;
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// Arbitrary precision decimal
    Decimal(Decimal),

    /// String value
    String(String),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// A globally unique identifier
    Uuid(Uuid),

    /// An instant in time, without offset
    Timestamp(Timestamp),

    /// An instant in time, together with the offset it was observed at
    DateTimeOffset(DateTimeOffset),

    /// A business object or a relational row
    Record(Record),

    /// A list of values of the same type
    List(Vec<Value>),
}

/// An instant paired with the UTC offset it was recorded in.
///
/// Two values are equal when they denote the same instant, whatever their
/// offsets.
#[derive(Debug, Clone, Copy)]
pub struct DateTimeOffset {
    pub timestamp: Timestamp,
    pub offset: Offset,
}

impl DateTimeOffset {
    pub fn new(timestamp: Timestamp, offset: Offset) -> DateTimeOffset {
        DateTimeOffset { timestamp, offset }
    }

    pub fn utc(timestamp: Timestamp) -> DateTimeOffset {
        DateTimeOffset {
            timestamp,
            offset: Offset::UTC,
        }
    }
}

impl PartialEq for DateTimeOffset {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}

impl Eq for DateTimeOffset {}

impl std::hash::Hash for DateTimeOffset {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.timestamp.hash(state);
    }
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The runtime type of the value. Lists report the type of their first
    /// item.
    pub fn ty(&self) -> Type {
        match self {
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Bool,
            Value::I32(_) => Type::I32,
            Value::I64(_) => Type::I64,
            Value::Decimal(_) => Type::Decimal,
            Value::String(_) => Type::String,
            Value::Bytes(_) => Type::Bytes,
            Value::Uuid(_) => Type::Uuid,
            Value::Timestamp(_) => Type::Timestamp,
            Value::DateTimeOffset(_) => Type::DateTimeOffset,
            Value::Record(record) => Type::class(&record.class),
            Value::List(items) => Type::list(items.first().map(Value::ty).unwrap_or(Type::Null)),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Compares two values, treating all numeric variants as one domain.
    ///
    /// Returns `None` when the values are not comparable (different kinds,
    /// or either side is null).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;

        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            (I32(_) | I64(_), I32(_) | I64(_)) => Some(self.as_i64()?.cmp(&other.as_i64()?)),
            (Decimal(a), Decimal(b)) => Some(a.cmp(b)),
            (Decimal(a), I32(_) | I64(_)) => Some(a.cmp(&other.as_i64()?.into())),
            (I32(_) | I64(_), Decimal(b)) => Some(rust_decimal::Decimal::from(self.as_i64()?).cmp(b)),
            (String(a), String(b)) => Some(a.cmp(b)),
            (Bytes(a), Bytes(b)) => Some(a.cmp(b)),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (DateTimeOffset(a), DateTimeOffset(b)) => Some(a.timestamp.cmp(&b.timestamp)),
            (Timestamp(a), DateTimeOffset(b)) => Some(a.cmp(&b.timestamp)),
            (DateTimeOffset(a), Timestamp(b)) => Some(a.timestamp.cmp(b)),
            _ => None,
        }
    }

    /// Equality as the predicate evaluator sees it: null equals only null
    /// and numerics compare by value.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }

    /// Converts the value to `ty`, the way an explicit conversion node does.
    pub fn cast(self, ty: &Type) -> Result<Value> {
        use Value::*;

        let ty = ty.non_nullable();

        Ok(match (self, ty) {
            (Null, _) => Null,
            (value, Type::Null) => return Err(Error::type_conversion(value, "Null")),
            (I32(v), Type::I64) => I64(v as i64),
            (I64(v), Type::I32) => match i32::try_from(v) {
                Ok(v) => I32(v),
                Err(_) => return Err(Error::type_conversion(I64(v), "I32")),
            },
            (I32(v), Type::Decimal) => Decimal(v.into()),
            (I64(v), Type::Decimal) => Decimal(v.into()),
            (Decimal(v), Type::I64) => match v.to_i64() {
                Some(v) => I64(v),
                None => return Err(Error::type_conversion(Decimal(v), "I64")),
            },
            (Decimal(v), Type::I32) => match v.to_i32() {
                Some(v) => I32(v),
                None => return Err(Error::type_conversion(Decimal(v), "I32")),
            },
            (String(v), Type::Uuid) => match v.parse() {
                Ok(v) => Uuid(v),
                Err(_) => return Err(Error::type_conversion(String(v), "Uuid")),
            },
            (Uuid(v), Type::String) => String(v.to_string()),
            (Timestamp(v), Type::DateTimeOffset) => {
                DateTimeOffset(self::DateTimeOffset::utc(v))
            }
            (DateTimeOffset(v), Type::Timestamp) => Timestamp(v.timestamp),
            (Record(record), Type::Class(name)) if record.class == *name => Record(record),
            (value, ty) if value.ty() == *ty => value,
            (value, ty) => return Err(Error::type_conversion(value, format!("{ty:?}"))),
        })
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Self::I32(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<Decimal> for Value {
    fn from(src: Decimal) -> Self {
        Self::Decimal(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<Vec<u8>> for Value {
    fn from(src: Vec<u8>) -> Self {
        Self::Bytes(src)
    }
}

impl From<Uuid> for Value {
    fn from(src: Uuid) -> Self {
        Self::Uuid(src)
    }
}

impl From<Timestamp> for Value {
    fn from(src: Timestamp) -> Self {
        Self::Timestamp(src)
    }
}

impl From<DateTimeOffset> for Value {
    fn from(src: DateTimeOffset) -> Self {
        Self::DateTimeOffset(src)
    }
}

impl From<Record> for Value {
    fn from(src: Record) -> Self {
        Self::Record(src)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Self {
        match src {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn date_time_offsets_compare_by_instant() {
        let noon: Timestamp = "2024-03-10T12:00:00Z".parse().unwrap();
        let utc = DateTimeOffset::utc(noon);
        let plus_two = DateTimeOffset::new(noon, Offset::constant(2));

        assert_eq!(utc, plus_two);
        assert_ne!(utc, DateTimeOffset::utc(Timestamp::UNIX_EPOCH));

        let set: HashSet<_> = [Value::from(utc), Value::from(plus_two)].into();
        assert_eq!(set.len(), 1);
    }
}
