#![allow(unused_variables)]

use super::{
    Expr, ExprAnd, ExprBinaryOp, ExprCall, ExprConvert, ExprLambda, ExprMember, ExprNot, ExprOr,
    ExprParam, Value,
};

pub trait Visit {
    fn visit_expr(&mut self, i: &Expr) {
        visit_expr(self, i);
    }

    fn visit_expr_and(&mut self, i: &ExprAnd) {
        visit_expr_and(self, i);
    }

    fn visit_expr_binary_op(&mut self, i: &ExprBinaryOp) {
        visit_expr_binary_op(self, i);
    }

    fn visit_expr_call(&mut self, i: &ExprCall) {
        visit_expr_call(self, i);
    }

    fn visit_expr_convert(&mut self, i: &ExprConvert) {
        visit_expr_convert(self, i);
    }

    fn visit_expr_lambda(&mut self, i: &ExprLambda) {
        visit_expr_lambda(self, i);
    }

    fn visit_expr_member(&mut self, i: &ExprMember) {
        visit_expr_member(self, i);
    }

    fn visit_expr_not(&mut self, i: &ExprNot) {
        visit_expr_not(self, i);
    }

    fn visit_expr_or(&mut self, i: &ExprOr) {
        visit_expr_or(self, i);
    }

    fn visit_expr_param(&mut self, i: &ExprParam) {
        visit_expr_param(self, i);
    }

    fn visit_value(&mut self, i: &Value) {
        visit_value(self, i);
    }
}

impl<V: Visit> Visit for &mut V {
    fn visit_expr(&mut self, i: &Expr) {
        Visit::visit_expr(&mut **self, i);
    }

    fn visit_expr_and(&mut self, i: &ExprAnd) {
        Visit::visit_expr_and(&mut **self, i);
    }

    fn visit_expr_binary_op(&mut self, i: &ExprBinaryOp) {
        Visit::visit_expr_binary_op(&mut **self, i);
    }

    fn visit_expr_call(&mut self, i: &ExprCall) {
        Visit::visit_expr_call(&mut **self, i);
    }

    fn visit_expr_convert(&mut self, i: &ExprConvert) {
        Visit::visit_expr_convert(&mut **self, i);
    }

    fn visit_expr_lambda(&mut self, i: &ExprLambda) {
        Visit::visit_expr_lambda(&mut **self, i);
    }

    fn visit_expr_member(&mut self, i: &ExprMember) {
        Visit::visit_expr_member(&mut **self, i);
    }

    fn visit_expr_not(&mut self, i: &ExprNot) {
        Visit::visit_expr_not(&mut **self, i);
    }

    fn visit_expr_or(&mut self, i: &ExprOr) {
        Visit::visit_expr_or(&mut **self, i);
    }

    fn visit_expr_param(&mut self, i: &ExprParam) {
        Visit::visit_expr_param(&mut **self, i);
    }

    fn visit_value(&mut self, i: &Value) {
        Visit::visit_value(&mut **self, i);
    }
}

pub fn visit_expr<V>(v: &mut V, node: &Expr)
where
    V: Visit + ?Sized,
{
    match node {
        Expr::And(expr) => v.visit_expr_and(expr),
        Expr::BinaryOp(expr) => v.visit_expr_binary_op(expr),
        Expr::Call(expr) => v.visit_expr_call(expr),
        Expr::Convert(expr) => v.visit_expr_convert(expr),
        Expr::Lambda(expr) => v.visit_expr_lambda(expr),
        Expr::Member(expr) => v.visit_expr_member(expr),
        Expr::Not(expr) => v.visit_expr_not(expr),
        Expr::Or(expr) => v.visit_expr_or(expr),
        Expr::Param(expr) => v.visit_expr_param(expr),
        Expr::Value(expr) => v.visit_value(expr),
    }
}

pub fn visit_expr_and<V>(v: &mut V, node: &ExprAnd)
where
    V: Visit + ?Sized,
{
    for expr in &node.operands {
        v.visit_expr(expr);
    }
}

pub fn visit_expr_binary_op<V>(v: &mut V, node: &ExprBinaryOp)
where
    V: Visit + ?Sized,
{
    v.visit_expr(&node.lhs);
    v.visit_expr(&node.rhs);
}

pub fn visit_expr_call<V>(v: &mut V, node: &ExprCall)
where
    V: Visit + ?Sized,
{
    v.visit_expr(&node.receiver);

    for arg in &node.args {
        v.visit_expr(arg);
    }
}

pub fn visit_expr_convert<V>(v: &mut V, node: &ExprConvert)
where
    V: Visit + ?Sized,
{
    v.visit_expr(&node.expr);
}

pub fn visit_expr_lambda<V>(v: &mut V, node: &ExprLambda)
where
    V: Visit + ?Sized,
{
    v.visit_expr(&node.body);
}

pub fn visit_expr_member<V>(v: &mut V, node: &ExprMember)
where
    V: Visit + ?Sized,
{
    v.visit_expr(&node.receiver);
}

pub fn visit_expr_not<V>(v: &mut V, node: &ExprNot)
where
    V: Visit + ?Sized,
{
    v.visit_expr(&node.expr);
}

pub fn visit_expr_or<V>(v: &mut V, node: &ExprOr)
where
    V: Visit + ?Sized,
{
    for expr in &node.operands {
        v.visit_expr(expr);
    }
}

pub fn visit_expr_param<V>(v: &mut V, node: &ExprParam)
where
    V: Visit + ?Sized,
{
}

pub fn visit_value<V>(v: &mut V, node: &Value)
where
    V: Visit + ?Sized,
{
}

/// Calls `f` for every node of the tree, parents before children.
pub fn for_each_expr<F>(node: &Expr, f: F)
where
    F: FnMut(&Expr),
{
    struct ForEach<F> {
        f: F,
    }

    impl<F> Visit for ForEach<F>
    where
        F: FnMut(&Expr),
    {
        fn visit_expr(&mut self, node: &Expr) {
            (self.f)(node);
            visit_expr(self, node);
        }
    }

    ForEach { f }.visit_expr(node);
}
