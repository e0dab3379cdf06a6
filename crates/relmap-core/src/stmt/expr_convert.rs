use super::{Expr, Type};

/// Explicit conversion, inserted when the operands of a comparison stop
/// agreeing on a type after rewriting.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprConvert {
    pub expr: Box<Expr>,
    pub ty: Type,
}

impl Expr {
    pub fn convert(expr: impl Into<Expr>, ty: Type) -> Expr {
        ExprConvert {
            expr: Box::new(expr.into()),
            ty,
        }
        .into()
    }
}

impl From<ExprConvert> for Expr {
    fn from(value: ExprConvert) -> Self {
        Self::Convert(value)
    }
}
