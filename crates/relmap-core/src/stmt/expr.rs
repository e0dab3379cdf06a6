use super::*;

/// A predicate expression over business-model or relational types.
///
/// Every node carries enough type information for [`Expr::ty`] to compute
/// its static type without consulting a catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of boolean expressions
    And(ExprAnd),

    /// Comparison between two expressions
    BinaryOp(ExprBinaryOp),

    /// Method call: collection combinators and string methods
    Call(ExprCall),

    /// Explicit conversion of an expression to a different type
    Convert(ExprConvert),

    /// Anonymous function, the argument of a collection combinator or the
    /// predicate itself
    Lambda(ExprLambda),

    /// Property access on a record-typed receiver
    Member(ExprMember),

    /// Negate a boolean expression
    Not(ExprNot),

    /// OR a set of boolean expressions
    Or(ExprOr),

    /// Reference to a lambda parameter
    Param(ExprParam),

    /// Evaluates to a constant value
    Value(Value),
}

impl Expr {
    pub fn value(value: impl Into<Value>) -> Expr {
        Expr::Value(value.into())
    }

    pub fn null() -> Expr {
        Expr::Value(Value::Null)
    }

    /// Is a value that evaluates to null
    pub fn is_value_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Returns true if the expression is a constant value.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(..))
    }

    pub fn is_param(&self) -> bool {
        matches!(self, Self::Param(..))
    }

    pub fn as_member(&self) -> Option<&ExprMember> {
        match self {
            Expr::Member(member) => Some(member),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&ExprLambda> {
        match self {
            Expr::Lambda(lambda) => Some(lambda),
            _ => None,
        }
    }

    /// The static type of the expression.
    pub fn ty(&self) -> Type {
        match self {
            Expr::And(_) | Expr::BinaryOp(_) | Expr::Not(_) | Expr::Or(_) => Type::Bool,
            Expr::Call(expr) => expr.ty(),
            Expr::Convert(expr) => expr.ty.clone(),
            Expr::Lambda(expr) => expr.ty(),
            Expr::Member(expr) => expr.ty.clone(),
            Expr::Param(expr) => expr.ty.clone(),
            Expr::Value(value) => value.ty(),
        }
    }

    /// Returns true when the expression references no parameters and can be
    /// folded to a constant.
    pub fn is_const(&self) -> bool {
        struct FindParam(bool);

        impl Visit for FindParam {
            fn visit_expr_param(&mut self, _: &ExprParam) {
                self.0 = true;
            }
        }

        let mut find = FindParam(false);
        find.visit_expr(self);
        !find.0
    }
}

// === Conversions ===

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Value(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::Value(value.into())
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<uuid::Uuid> for Expr {
    fn from(value: uuid::Uuid) -> Self {
        Self::Value(value.into())
    }
}
