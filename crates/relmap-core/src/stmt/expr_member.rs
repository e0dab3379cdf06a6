use super::{Expr, Type};

/// Access to the property `name` of a record-typed receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprMember {
    pub receiver: Box<Expr>,
    pub name: String,

    /// Type of the accessed property
    pub ty: Type,
}

impl ExprMember {
    /// Name of the class declaring the member, when the receiver is a class.
    pub fn declaring_class(&self) -> Option<String> {
        self.receiver.ty().as_class().map(str::to_string)
    }
}

impl Expr {
    pub fn member(receiver: impl Into<Expr>, name: impl Into<String>, ty: Type) -> Expr {
        ExprMember {
            receiver: Box::new(receiver.into()),
            name: name.into(),
            ty,
        }
        .into()
    }
}

impl From<ExprMember> for Expr {
    fn from(value: ExprMember) -> Self {
        Expr::Member(value)
    }
}
