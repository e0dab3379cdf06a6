#![allow(unused_variables)]

use super::*;

pub trait VisitMut {
    fn visit_expr_mut(&mut self, i: &mut Expr) {
        visit_expr_mut(self, i);
    }

    fn visit_expr_and_mut(&mut self, i: &mut ExprAnd) {
        visit_expr_and_mut(self, i);
    }

    fn visit_expr_binary_op_mut(&mut self, i: &mut ExprBinaryOp) {
        visit_expr_binary_op_mut(self, i);
    }

    fn visit_expr_call_mut(&mut self, i: &mut ExprCall) {
        visit_expr_call_mut(self, i);
    }

    fn visit_expr_convert_mut(&mut self, i: &mut ExprConvert) {
        visit_expr_convert_mut(self, i);
    }

    fn visit_expr_lambda_mut(&mut self, i: &mut ExprLambda) {
        visit_expr_lambda_mut(self, i);
    }

    fn visit_expr_member_mut(&mut self, i: &mut ExprMember) {
        visit_expr_member_mut(self, i);
    }

    fn visit_expr_not_mut(&mut self, i: &mut ExprNot) {
        visit_expr_not_mut(self, i);
    }

    fn visit_expr_or_mut(&mut self, i: &mut ExprOr) {
        visit_expr_or_mut(self, i);
    }

    fn visit_expr_param_mut(&mut self, i: &mut ExprParam) {
        visit_expr_param_mut(self, i);
    }

    fn visit_value_mut(&mut self, i: &mut Value) {
        visit_value_mut(self, i);
    }
}

pub fn visit_expr_mut<V>(v: &mut V, node: &mut Expr)
where
    V: VisitMut + ?Sized,
{
    match node {
        Expr::And(expr) => v.visit_expr_and_mut(expr),
        Expr::BinaryOp(expr) => v.visit_expr_binary_op_mut(expr),
        Expr::Call(expr) => v.visit_expr_call_mut(expr),
        Expr::Convert(expr) => v.visit_expr_convert_mut(expr),
        Expr::Lambda(expr) => v.visit_expr_lambda_mut(expr),
        Expr::Member(expr) => v.visit_expr_member_mut(expr),
        Expr::Not(expr) => v.visit_expr_not_mut(expr),
        Expr::Or(expr) => v.visit_expr_or_mut(expr),
        Expr::Param(expr) => v.visit_expr_param_mut(expr),
        Expr::Value(expr) => v.visit_value_mut(expr),
    }
}

pub fn visit_expr_and_mut<V>(v: &mut V, node: &mut ExprAnd)
where
    V: VisitMut + ?Sized,
{
    for expr in &mut node.operands {
        v.visit_expr_mut(expr);
    }
}

pub fn visit_expr_binary_op_mut<V>(v: &mut V, node: &mut ExprBinaryOp)
where
    V: VisitMut + ?Sized,
{
    v.visit_expr_mut(&mut node.lhs);
    v.visit_expr_mut(&mut node.rhs);
}

pub fn visit_expr_call_mut<V>(v: &mut V, node: &mut ExprCall)
where
    V: VisitMut + ?Sized,
{
    v.visit_expr_mut(&mut node.receiver);

    for arg in &mut node.args {
        v.visit_expr_mut(arg);
    }
}

pub fn visit_expr_convert_mut<V>(v: &mut V, node: &mut ExprConvert)
where
    V: VisitMut + ?Sized,
{
    v.visit_expr_mut(&mut node.expr);
}

pub fn visit_expr_lambda_mut<V>(v: &mut V, node: &mut ExprLambda)
where
    V: VisitMut + ?Sized,
{
    v.visit_expr_mut(&mut node.body);
}

pub fn visit_expr_member_mut<V>(v: &mut V, node: &mut ExprMember)
where
    V: VisitMut + ?Sized,
{
    v.visit_expr_mut(&mut node.receiver);
}

pub fn visit_expr_not_mut<V>(v: &mut V, node: &mut ExprNot)
where
    V: VisitMut + ?Sized,
{
    v.visit_expr_mut(&mut node.expr);
}

pub fn visit_expr_or_mut<V>(v: &mut V, node: &mut ExprOr)
where
    V: VisitMut + ?Sized,
{
    for expr in &mut node.operands {
        v.visit_expr_mut(expr);
    }
}

pub fn visit_expr_param_mut<V>(v: &mut V, node: &mut ExprParam)
where
    V: VisitMut + ?Sized,
{
}

pub fn visit_value_mut<V>(v: &mut V, node: &mut Value)
where
    V: VisitMut + ?Sized,
{
}
