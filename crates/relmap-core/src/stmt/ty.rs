use serde::{Deserialize, Serialize};

/// Static type of an expression, a property, or a value.
///
/// Classes are referenced by name and resolved against a
/// [`Catalog`](crate::schema::Catalog). Containers are represented by
/// [`Type::Generic`]; the single-argument `List` container is the shape
/// collection navigation properties use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Type {
    Bool,
    I32,
    I64,
    Decimal,
    String,
    Bytes,
    Uuid,
    Timestamp,
    DateTimeOffset,

    /// The type of the `null` literal.
    Null,

    /// A value of the inner type or null.
    Nullable(Box<Type>),

    /// A business-model or relational row class.
    Class(String),

    /// A generic container, `List<T>` being the common case.
    Generic { name: String, args: Vec<Type> },

    /// The type of a lambda expression.
    Fn { params: Vec<Type>, ret: Box<Type> },
}

pub const LIST: &str = "List";

impl Type {
    pub fn class(name: impl Into<String>) -> Type {
        Type::Class(name.into())
    }

    pub fn list(item: Type) -> Type {
        Type::Generic {
            name: LIST.to_string(),
            args: vec![item],
        }
    }

    pub fn nullable(ty: Type) -> Type {
        match ty {
            Type::Nullable(_) | Type::Null => ty,
            ty => Type::Nullable(Box::new(ty)),
        }
    }

    pub fn as_class(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            Type::Nullable(inner) => inner.as_class(),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        self.as_class().is_some()
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Type::Generic { .. })
    }

    /// Element type of a single-argument container.
    pub fn item(&self) -> Option<&Type> {
        match self {
            Type::Generic { args, .. } if args.len() == 1 => Some(&args[0]),
            _ => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_) | Type::Null)
    }

    /// Strips one level of `Nullable`.
    pub fn non_nullable(&self) -> &Type {
        match self {
            Type::Nullable(inner) => inner,
            ty => ty,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.non_nullable(),
            Type::I32 | Type::I64 | Type::Decimal
        )
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(
            self.non_nullable(),
            Type::Class(_) | Type::Generic { .. } | Type::Fn { .. }
        )
    }

    /// Returns true when a value of type `other` can be compared to a value
    /// of this type without an explicit conversion.
    pub fn is_compatible(&self, other: &Type) -> bool {
        self == other || matches!(other, Type::Null) || matches!(self, Type::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_item() {
        let ty = Type::list(Type::class("EntityName"));
        assert!(ty.is_collection());
        assert_eq!(ty.item(), Some(&Type::class("EntityName")));
    }

    #[test]
    fn nullable_is_not_nested() {
        let ty = Type::nullable(Type::nullable(Type::Uuid));
        assert_eq!(ty, Type::Nullable(Box::new(Type::Uuid)));
        assert_eq!(ty.non_nullable(), &Type::Uuid);
    }

    #[test]
    fn nullable_class_is_still_a_class() {
        assert_eq!(Type::nullable(Type::class("Concept")).as_class(), Some("Concept"));
    }

    #[test]
    fn compatibility_requires_exact_match() {
        assert!(Type::I32.is_compatible(&Type::I32));
        assert!(Type::Uuid.is_compatible(&Type::Null));
        assert!(!Type::I64.is_compatible(&Type::I32));
        assert!(!Type::nullable(Type::Uuid).is_compatible(&Type::Uuid));
    }
}
