use super::{Expr, Type};

/// A lambda parameter.
///
/// Parameters are identified by name and type: two parameters with the same
/// name and type are the same binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprParam {
    pub name: String,
    pub ty: Type,
}

impl ExprParam {
    pub fn new(name: impl Into<String>, ty: Type) -> ExprParam {
        ExprParam {
            name: name.into(),
            ty,
        }
    }
}

impl Expr {
    pub fn param(name: impl Into<String>, ty: Type) -> Expr {
        ExprParam::new(name, ty).into()
    }
}

impl From<ExprParam> for Expr {
    fn from(value: ExprParam) -> Self {
        Expr::Param(value)
    }
}

impl From<&ExprParam> for Expr {
    fn from(value: &ExprParam) -> Self {
        Expr::Param(value.clone())
    }
}
