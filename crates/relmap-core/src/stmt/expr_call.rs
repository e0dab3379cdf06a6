use super::{Expr, ExprLambda, Method, Type};
use crate::Result;

/// A method call on a receiver.
///
/// ```text
/// patient.names.any(|n| n.family == "Smith")
/// patient.family.starts_with("Sm")
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExprCall {
    pub method: Method,
    pub receiver: Box<Expr>,
    pub args: Vec<Expr>,
}

impl ExprCall {
    pub fn new(method: Method, receiver: impl Into<Expr>, args: Vec<Expr>) -> Result<ExprCall> {
        let (min, max) = method.arity();

        if args.len() < min || args.len() > max {
            crate::bail!(
                "{method} takes between {min} and {max} arguments; {} given",
                args.len()
            );
        }

        Ok(ExprCall {
            method,
            receiver: Box::new(receiver.into()),
            args,
        })
    }

    /// The lambda argument of a collection combinator, if any.
    pub fn lambda(&self) -> Option<&ExprLambda> {
        self.args.first().and_then(Expr::as_lambda)
    }

    pub fn ty(&self) -> Type {
        match self.method {
            Method::Count => Type::I64,
            Method::Where => self.receiver.ty(),
            Method::ToLower | Method::ToUpper => Type::String,
            _ => Type::Bool,
        }
    }
}

impl Expr {
    pub fn call(method: Method, receiver: impl Into<Expr>, args: Vec<Expr>) -> Result<Expr> {
        Ok(ExprCall::new(method, receiver, args)?.into())
    }

    pub fn any(receiver: impl Into<Expr>, predicate: Option<ExprLambda>) -> Expr {
        ExprCall {
            method: Method::Any,
            receiver: Box::new(receiver.into()),
            args: predicate.into_iter().map(Expr::from).collect(),
        }
        .into()
    }

    pub fn all(receiver: impl Into<Expr>, predicate: ExprLambda) -> Expr {
        ExprCall {
            method: Method::All,
            receiver: Box::new(receiver.into()),
            args: vec![predicate.into()],
        }
        .into()
    }

    pub fn filter(receiver: impl Into<Expr>, predicate: ExprLambda) -> Expr {
        ExprCall {
            method: Method::Where,
            receiver: Box::new(receiver.into()),
            args: vec![predicate.into()],
        }
        .into()
    }

    pub fn count(receiver: impl Into<Expr>, predicate: Option<ExprLambda>) -> Expr {
        ExprCall {
            method: Method::Count,
            receiver: Box::new(receiver.into()),
            args: predicate.into_iter().map(Expr::from).collect(),
        }
        .into()
    }

    pub fn starts_with(receiver: impl Into<Expr>, prefix: impl Into<Expr>) -> Expr {
        Expr::string_method(Method::StartsWith, receiver, prefix)
    }

    pub fn ends_with(receiver: impl Into<Expr>, suffix: impl Into<Expr>) -> Expr {
        Expr::string_method(Method::EndsWith, receiver, suffix)
    }

    pub fn contains(receiver: impl Into<Expr>, needle: impl Into<Expr>) -> Expr {
        Expr::string_method(Method::Contains, receiver, needle)
    }

    pub fn like(receiver: impl Into<Expr>, pattern: impl Into<Expr>) -> Expr {
        Expr::string_method(Method::Like, receiver, pattern)
    }

    pub fn ilike(receiver: impl Into<Expr>, pattern: impl Into<Expr>) -> Expr {
        Expr::string_method(Method::ILike, receiver, pattern)
    }

    pub fn to_lower(receiver: impl Into<Expr>) -> Expr {
        ExprCall {
            method: Method::ToLower,
            receiver: Box::new(receiver.into()),
            args: vec![],
        }
        .into()
    }

    pub fn to_upper(receiver: impl Into<Expr>) -> Expr {
        ExprCall {
            method: Method::ToUpper,
            receiver: Box::new(receiver.into()),
            args: vec![],
        }
        .into()
    }

    fn string_method(method: Method, receiver: impl Into<Expr>, arg: impl Into<Expr>) -> Expr {
        ExprCall {
            method,
            receiver: Box::new(receiver.into()),
            args: vec![arg.into()],
        }
        .into()
    }
}

impl From<ExprCall> for Expr {
    fn from(value: ExprCall) -> Self {
        Self::Call(value)
    }
}
