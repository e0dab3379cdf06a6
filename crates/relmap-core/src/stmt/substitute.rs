use super::{visit_mut, Expr, ExprParam};

use std::collections::HashMap;

/// Maps bound parameters to the expressions that replace them.
#[derive(Debug, Default, Clone)]
pub struct Env {
    bindings: HashMap<ExprParam, Expr>,
}

impl Env {
    pub fn new() -> Env {
        Env::default()
    }

    pub fn bind(&mut self, param: ExprParam, replacement: impl Into<Expr>) {
        self.bindings.insert(param, replacement.into());
    }

    pub fn with(mut self, param: ExprParam, replacement: impl Into<Expr>) -> Env {
        self.bind(param, replacement);
        self
    }

    pub fn get(&self, param: &ExprParam) -> Option<&Expr> {
        self.bindings.get(param)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Replaces every free occurrence of a bound parameter in `expr`.
    ///
    /// A lambda that re-binds a parameter of the same name and type shadows
    /// the binding inside its body.
    pub fn substitute(&self, expr: &mut Expr) {
        if self.is_empty() {
            return;
        }

        visit_mut::VisitMut::visit_expr_mut(&mut Substitute { env: self }, expr);
    }
}

struct Substitute<'a> {
    env: &'a Env,
}

impl visit_mut::VisitMut for Substitute<'_> {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Param(param) => {
                if let Some(replacement) = self.env.get(param) {
                    *expr = replacement.clone();
                }
            }
            Expr::Lambda(lambda)
                if lambda
                    .params
                    .iter()
                    .any(|param| self.env.bindings.contains_key(param)) =>
            {
                let mut inner = self.env.clone();
                for param in &lambda.params {
                    inner.bindings.remove(param);
                }
                inner.substitute(&mut lambda.body);
            }
            _ => visit_mut::visit_expr_mut(self, expr),
        }
    }
}
