use super::ModelMapper;

use relmap_core::{
    stmt::{
        Env, Expr, ExprAnd, ExprBinaryOp, ExprCall, ExprLambda, ExprMember, ExprNot, ExprOr,
        ExprParam, Type,
    },
    Error, Result,
};

/// Rewrites an expression over business classes into the equivalent
/// expression over relational classes.
///
/// Sub-expressions that touch nothing mapped come back unchanged.
pub(crate) struct ModelExpressionVisitor<'a> {
    mapper: &'a ModelMapper,

    /// Parameters to reuse when a rewritten parameter matches one by name
    /// and type
    params: Vec<ExprParam>,
}

impl<'a> ModelExpressionVisitor<'a> {
    pub(crate) fn new(mapper: &'a ModelMapper, params: Vec<ExprParam>) -> Self {
        ModelExpressionVisitor { mapper, params }
    }

    pub(crate) fn rewrite(&mut self, expr: &Expr) -> Result<Expr> {
        match expr {
            Expr::And(expr) => Ok(ExprAnd {
                operands: self.rewrite_all(&expr.operands)?,
            }
            .into()),
            Expr::Or(expr) => Ok(ExprOr {
                operands: self.rewrite_all(&expr.operands)?,
            }
            .into()),
            Expr::Not(expr) => Ok(ExprNot {
                expr: Box::new(self.rewrite(&expr.expr)?),
            }
            .into()),
            Expr::BinaryOp(expr) => self.rewrite_binary_op(expr),
            Expr::Call(expr) => self.rewrite_call(expr),
            Expr::Convert(expr) => Ok(Expr::convert(self.rewrite(&expr.expr)?, expr.ty.clone())),
            Expr::Lambda(expr) => Ok(self.rewrite_lambda(expr)?.into()),
            Expr::Member(expr) => self.rewrite_member(expr),
            Expr::Param(expr) => Ok(self.rewrite_param(expr)?.into()),
            Expr::Value(_) => Ok(expr.clone()),
        }
    }

    fn rewrite_all(&mut self, exprs: &[Expr]) -> Result<Vec<Expr>> {
        exprs.iter().map(|expr| self.rewrite(expr)).collect()
    }

    /// Rewrites both operands. When they stop agreeing on a type, the right
    /// operand is converted to the left one's.
    fn rewrite_binary_op(&mut self, expr: &ExprBinaryOp) -> Result<Expr> {
        let lhs = self.rewrite(&expr.lhs)?;
        let mut rhs = self.rewrite(&expr.rhs)?;

        let (lhs_ty, rhs_ty) = (lhs.ty(), rhs.ty());
        if !compatible(&lhs_ty, &rhs_ty) {
            rhs = Expr::convert(rhs, lhs_ty);
        }

        Ok(Expr::binary_op(lhs, expr.op, rhs))
    }

    fn rewrite_member(&mut self, expr: &ExprMember) -> Result<Expr> {
        // `.key` of a collapsing navigation skips the navigation entirely
        let receiver = match (&*expr.receiver, self.mapper.collapse_key(expr)) {
            (Expr::Member(navigation), Some(_)) => &navigation.receiver,
            _ => &expr.receiver,
        };

        let access = self.rewrite(receiver)?;

        if access == **receiver {
            return Ok(expr.clone().into());
        }

        self.mapper.map_model_member(expr, access)
    }

    fn rewrite_param(&mut self, expr: &ExprParam) -> Result<ExprParam> {
        let ty = self.mapper.map_model_type(&expr.ty)?;

        if ty == expr.ty {
            return Ok(expr.clone());
        }

        let reused = self
            .params
            .iter()
            .find(|param| param.name == expr.name && param.ty == ty);

        Ok(match reused {
            Some(param) => param.clone(),
            None => ExprParam::new(&expr.name, ty),
        })
    }

    fn rewrite_lambda(&mut self, expr: &ExprLambda) -> Result<ExprLambda> {
        let body = self.rewrite(&expr.body)?;

        if body == *expr.body {
            return Ok(expr.clone());
        }

        let params = expr
            .params
            .iter()
            .map(|param| self.rewrite_param(param))
            .collect::<Result<_>>()?;

        Ok(ExprLambda::new(params, body))
    }

    /// Rewrites the receiver and arguments of a call. A combinator's lambda
    /// whose parameter no longer matches the element type of the rewritten
    /// collection is rebound to a parameter of that element type.
    fn rewrite_call(&mut self, expr: &ExprCall) -> Result<Expr> {
        let receiver = self.rewrite(&expr.receiver)?;

        let mut args = Vec::with_capacity(expr.args.len());

        for arg in &expr.args {
            let arg = match arg {
                Expr::Lambda(lambda) if expr.method.is_combinator() => {
                    let element = self.mapper.extract_domain_type(&receiver.ty())?;
                    self.rewrite_predicate(&expr.receiver, lambda, element)?.into()
                }
                arg => self.rewrite(arg)?,
            };

            args.push(arg);
        }

        Ok(ExprCall {
            method: expr.method,
            receiver: Box::new(receiver),
            args,
        }
        .into())
    }

    /// Rewrites the lambda of a combinator applied to `root`, whose elements
    /// are now of type `element`.
    fn rewrite_predicate(
        &mut self,
        root: &Expr,
        lambda: &ExprLambda,
        element: Type,
    ) -> Result<ExprLambda> {
        let [param] = &lambda.params[..] else {
            return Err(Error::invalid_operation(
                "a collection predicate takes exactly one parameter",
            ));
        };

        let mapped = self.rewrite_param(param)?;
        let mut body = self.rewrite(&lambda.body)?;

        if mapped.ty == element || !element.is_class() {
            return Ok(ExprLambda::unary(mapped, body));
        }

        // The collection now yields rows a `via` hop short of the type the
        // lambda expects: bind a parameter of the element type and
        // substitute the hop access for the mapped parameter.
        let corrected = ExprParam::new(&param.name, element);
        let adjustment = self
            .mapper
            .create_lambda_member_adjustment_expression(root, &corrected)?;

        if !compatible(&adjustment.ty(), &mapped.ty) {
            return Err(Error::invalid_operation(format!(
                "cannot rebind `{}` of type {:?} to {:?}",
                param.name,
                mapped.ty,
                adjustment.ty()
            )));
        }

        Env::new().with(mapped, adjustment).substitute(&mut body);

        Ok(ExprLambda::unary(corrected, body))
    }
}

/// Whether values of the two types compare without a conversion.
fn compatible(lhs: &Type, rhs: &Type) -> bool {
    matches!(lhs, Type::Null)
        || matches!(rhs, Type::Null)
        || lhs.non_nullable() == rhs.non_nullable()
}
