use super::*;
use crate::{Error, Result};

use std::cmp::Ordering;

/// Bindings for lambda parameters, innermost scope first.
enum ScopeStack<'a> {
    Root,
    Scope {
        params: &'a [ExprParam],
        args: &'a [Value],
        parent: &'a ScopeStack<'a>,
    },
}

impl ExprLambda {
    /// Applies the lambda to `args`.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        self.call_ref(&ScopeStack::Root, args)
    }

    /// Applies a predicate lambda and interprets its result as a boolean.
    pub fn call_bool(&self, args: &[Value]) -> Result<bool> {
        truthy(self.call(args)?)
    }

    fn call_ref(&self, scope: &ScopeStack<'_>, args: &[Value]) -> Result<Value> {
        if args.len() != self.params.len() {
            return Err(Error::invalid_operation(format!(
                "lambda takes {} arguments; {} given",
                self.params.len(),
                args.len()
            )));
        }

        let scope = scope.scope(&self.params, args);
        self.body.eval_ref(&scope)
    }
}

impl Expr {
    /// Evaluates an expression that references no parameters.
    pub fn eval_const(&self) -> Result<Value> {
        self.eval_ref(&ScopeStack::Root)
    }

    fn eval_ref(&self, scope: &ScopeStack<'_>) -> Result<Value> {
        match self {
            Expr::And(expr) => {
                for operand in &expr.operands {
                    if !truthy(operand.eval_ref(scope)?)? {
                        return Ok(false.into());
                    }
                }

                Ok(true.into())
            }
            Expr::BinaryOp(expr) => {
                let lhs = expr.lhs.eval_ref(scope)?;
                let rhs = expr.rhs.eval_ref(scope)?;

                Ok(match expr.op {
                    BinaryOp::Eq => lhs.is_equal(&rhs),
                    BinaryOp::Ne => !lhs.is_equal(&rhs),
                    BinaryOp::Ge => cmp(&lhs, &rhs, Ordering::is_ge),
                    BinaryOp::Gt => cmp(&lhs, &rhs, Ordering::is_gt),
                    BinaryOp::Le => cmp(&lhs, &rhs, Ordering::is_le),
                    BinaryOp::Lt => cmp(&lhs, &rhs, Ordering::is_lt),
                }
                .into())
            }
            Expr::Call(expr) => expr.eval_ref(scope),
            Expr::Convert(expr) => expr.expr.eval_ref(scope)?.cast(&expr.ty),
            Expr::Lambda(_) => Err(Error::invalid_operation(
                "a lambda cannot be evaluated outside of a method call",
            )),
            Expr::Member(expr) => match expr.receiver.eval_ref(scope)? {
                Value::Null => Ok(Value::Null),
                Value::Record(record) => Ok(record.get(&expr.name).clone()),
                value => Err(Error::invalid_operation(format!(
                    "member `{}` accessed on non-record value of type {:?}",
                    expr.name,
                    value.ty()
                ))),
            },
            Expr::Not(expr) => Ok((!truthy(expr.expr.eval_ref(scope)?)?).into()),
            Expr::Or(expr) => {
                for operand in &expr.operands {
                    if truthy(operand.eval_ref(scope)?)? {
                        return Ok(true.into());
                    }
                }

                Ok(false.into())
            }
            Expr::Param(expr) => scope.resolve(expr).cloned().ok_or_else(|| {
                Error::invalid_operation(format!("unbound parameter `{}`", expr.name))
            }),
            Expr::Value(value) => Ok(value.clone()),
        }
    }
}

impl ExprCall {
    fn eval_ref(&self, scope: &ScopeStack<'_>) -> Result<Value> {
        let receiver = self.receiver.eval_ref(scope)?;

        if self.method.is_combinator() {
            let items = match receiver {
                Value::Null => vec![],
                Value::List(items) => items,
                value => {
                    return Err(Error::invalid_operation(format!(
                        "{} called on non-collection value of type {:?}",
                        self.method,
                        value.ty()
                    )))
                }
            };

            let predicate = match self.args.first() {
                Some(Expr::Lambda(lambda)) => Some(lambda),
                Some(_) => {
                    return Err(Error::invalid_operation(format!(
                        "{} expects a lambda argument",
                        self.method
                    )))
                }
                None => None,
            };

            let test = |item: &Value| -> Result<bool> {
                match predicate {
                    Some(lambda) => truthy(lambda.call_ref(scope, std::slice::from_ref(item))?),
                    None => Ok(true),
                }
            };

            return Ok(match self.method {
                Method::Any => {
                    for item in &items {
                        if test(item)? {
                            return Ok(true.into());
                        }
                    }
                    false.into()
                }
                Method::All => {
                    for item in &items {
                        if !test(item)? {
                            return Ok(false.into());
                        }
                    }
                    true.into()
                }
                Method::Count => {
                    let mut count = 0i64;
                    for item in &items {
                        if test(item)? {
                            count += 1;
                        }
                    }
                    count.into()
                }
                Method::Where => {
                    let mut matched = vec![];
                    for item in items {
                        if test(&item)? {
                            matched.push(item);
                        }
                    }
                    Value::List(matched)
                }
                _ => unreachable!(),
            });
        }

        let receiver = match receiver {
            Value::Null => {
                return Ok(match self.method {
                    Method::ToLower | Method::ToUpper => Value::Null,
                    _ => false.into(),
                })
            }
            Value::String(value) => value,
            value => return Err(Error::type_conversion(value, "String")),
        };

        let operand = match self.args.first() {
            Some(arg) => match arg.eval_ref(scope)? {
                Value::Null => return Ok(false.into()),
                Value::String(value) => Some(value),
                value => return Err(Error::type_conversion(value, "String")),
            },
            None => None,
        };
        let operand = operand.as_deref().unwrap_or_default();

        Ok(match self.method {
            Method::StartsWith => receiver.starts_with(operand).into(),
            Method::EndsWith => receiver.ends_with(operand).into(),
            Method::Contains => receiver.contains(operand).into(),
            Method::Like => like::like(&receiver, operand, false).into(),
            Method::ILike => like::like(&receiver, operand, true).into(),
            Method::ToLower => receiver.to_lowercase().into(),
            Method::ToUpper => receiver.to_uppercase().into(),
            _ => unreachable!(),
        })
    }
}

impl<'a> ScopeStack<'a> {
    fn resolve(&self, param: &ExprParam) -> Option<&Value> {
        let mut scope = self;

        loop {
            match scope {
                ScopeStack::Root => return None,
                ScopeStack::Scope {
                    params,
                    args,
                    parent,
                } => {
                    if let Some(index) = params.iter().position(|p| p.name == param.name) {
                        return args.get(index);
                    }
                    scope = parent;
                }
            }
        }
    }

    fn scope<'child>(
        &'child self,
        params: &'child [ExprParam],
        args: &'child [Value],
    ) -> ScopeStack<'child> {
        ScopeStack::Scope {
            params,
            args,
            parent: self,
        }
    }
}

/// Null compares as false against everything, SQL style.
fn cmp(lhs: &Value, rhs: &Value, f: fn(Ordering) -> bool) -> bool {
    lhs.compare(rhs).map(f).unwrap_or(false)
}

fn truthy(value: Value) -> Result<bool> {
    match value {
        Value::Bool(value) => Ok(value),
        Value::Null => Ok(false),
        value => Err(Error::type_conversion(value, "Bool")),
    }
}
