use super::{Expr, ExprParam, Type};

/// An anonymous function over typed parameters.
///
/// A top-level predicate is a single-parameter lambda whose body is
/// boolean; collection combinators take a lambda over the element type.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprLambda {
    pub params: Vec<ExprParam>,
    pub body: Box<Expr>,
}

impl ExprLambda {
    pub fn new(params: Vec<ExprParam>, body: impl Into<Expr>) -> ExprLambda {
        ExprLambda {
            params,
            body: Box::new(body.into()),
        }
    }

    /// Shorthand for a single-parameter lambda.
    pub fn unary(param: ExprParam, body: impl Into<Expr>) -> ExprLambda {
        ExprLambda::new(vec![param], body)
    }

    /// The first parameter. Predicates and combinator arguments always have
    /// exactly one.
    pub fn param(&self) -> Option<&ExprParam> {
        self.params.first()
    }

    pub fn ty(&self) -> Type {
        Type::Fn {
            params: self.params.iter().map(|param| param.ty.clone()).collect(),
            ret: Box::new(self.body.ty()),
        }
    }
}

impl From<ExprLambda> for Expr {
    fn from(value: ExprLambda) -> Self {
        Self::Lambda(value)
    }
}
