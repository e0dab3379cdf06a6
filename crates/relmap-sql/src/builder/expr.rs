use super::{Alias, Arg, Binding, Column, Formatter, Ident, ToSql};

use relmap_core::{
    driver::SqlKeyword,
    schema::{Class, Relation},
    stmt::{BinaryOp, Expr, ExprCall, ExprLambda, ExprMember, ExprParam, Method, Type, Value},
    Error, Result,
};

/// A collection navigation, with any `Where` filters applied to it.
struct Source<'e> {
    owner: &'e Expr,
    owner_class: String,
    element: String,
    foreign_key: String,
    filters: Vec<&'e ExprLambda>,
}

impl Formatter<'_> {
    /// Serializes a boolean expression.
    pub(super) fn condition(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::And(expr) => self.connective(&expr.operands, " AND ", "1 = 1"),
            Expr::Or(expr) => self.connective(&expr.operands, " OR ", "1 = 0"),
            Expr::Not(expr) => {
                fmt!(self, "NOT (");
                self.condition(&expr.expr)?;
                fmt!(self, ")");
                Ok(())
            }
            Expr::BinaryOp(expr) => self.comparison(&expr.lhs, expr.op, &expr.rhs),
            Expr::Call(call) => match call.method {
                Method::Any => self.exists(call, false),
                Method::All => self.exists(call, true),
                Method::StartsWith | Method::EndsWith | Method::Contains => self.pattern(call),
                Method::Like | Method::ILike => {
                    let keyword = if call.method == Method::Like {
                        SqlKeyword::Like
                    } else {
                        SqlKeyword::ILike
                    };

                    self.scalar(&call.receiver)?;
                    fmt!(self, " " self.keyword(keyword) " ");
                    self.scalar(operand(call)?)
                }
                _ => Err(Error::unsupported_feature(format!(
                    "{} is not a predicate",
                    call.method
                ))),
            },
            Expr::Value(Value::Bool(true)) => {
                fmt!(self, "1 = 1");
                Ok(())
            }
            Expr::Value(Value::Bool(false) | Value::Null) => {
                fmt!(self, "1 = 0");
                Ok(())
            }
            expr => self.scalar(expr),
        }
    }

    /// Serializes a value-producing expression.
    fn scalar(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Value(value) => {
                fmt!(self, Arg(value.clone()));
                Ok(())
            }
            Expr::Convert(convert) => {
                if convert.expr.is_const() {
                    let value = convert.expr.eval_const()?.cast(&convert.ty)?;
                    fmt!(self, Arg(value));
                    Ok(())
                } else {
                    // Numeric widening and reference conversions need no SQL
                    self.scalar(&convert.expr)
                }
            }
            Expr::Member(member) => self.member(member),
            Expr::Call(call) => match call.method {
                Method::Count => self.count(call),
                Method::ToLower | Method::ToUpper => {
                    let keyword = if call.method == Method::ToLower {
                        SqlKeyword::Lower
                    } else {
                        SqlKeyword::Upper
                    };

                    fmt!(self, self.keyword(keyword) "(");
                    self.scalar(&call.receiver)?;
                    fmt!(self, ")");
                    Ok(())
                }
                Method::Where => Err(Error::unsupported_feature(
                    "Where must be the receiver of Any, All or Count",
                )),
                _ => self.parenthesized_condition(expr),
            },
            Expr::And(_) | Expr::Or(_) | Expr::Not(_) | Expr::BinaryOp(_) => {
                self.parenthesized_condition(expr)
            }
            Expr::Param(param) => Err(Error::unsupported_feature(format!(
                "row parameter `{}` used as a value",
                param.name
            ))),
            Expr::Lambda(_) => Err(Error::unsupported_feature(
                "lambda used outside of a collection method",
            )),
        }
    }

    fn parenthesized_condition(&mut self, expr: &Expr) -> Result<()> {
        fmt!(self, "(");
        self.condition(expr)?;
        fmt!(self, ")");
        Ok(())
    }

    fn connective(&mut self, operands: &[Expr], separator: &str, empty: &str) -> Result<()> {
        if operands.is_empty() {
            fmt!(self, empty);
            return Ok(());
        }

        fmt!(self, "(");
        let mut s = "";
        for operand in operands {
            fmt!(self, s);
            self.condition(operand)?;
            s = separator;
        }
        fmt!(self, ")");
        Ok(())
    }

    fn comparison(&mut self, lhs: &Expr, op: BinaryOp, rhs: &Expr) -> Result<()> {
        // Comparisons against null become IS [NOT] NULL
        let null_test = match (lhs.is_value_null(), rhs.is_value_null()) {
            (_, true) => Some(lhs),
            (true, false) => Some(rhs),
            (false, false) => None,
        };

        if let Some(operand) = null_test {
            return match op {
                BinaryOp::Eq => {
                    self.scalar(operand)?;
                    fmt!(self, " IS NULL");
                    Ok(())
                }
                BinaryOp::Ne => {
                    self.scalar(operand)?;
                    fmt!(self, " IS NOT NULL");
                    Ok(())
                }
                // Ordering against null is never true
                _ => {
                    fmt!(self, "1 = 0");
                    Ok(())
                }
            };
        }

        self.scalar(lhs)?;
        fmt!(self, " " operator(op) " ");
        self.scalar(rhs)
    }

    fn pattern(&mut self, call: &ExprCall) -> Result<()> {
        let (prefix, suffix) = match call.method {
            Method::StartsWith => ("", "%"),
            Method::EndsWith => ("%", ""),
            _ => ("%", "%"),
        };

        self.scalar(&call.receiver)?;
        fmt!(self, " " self.keyword(SqlKeyword::Like) " ");

        let operand = operand(call)?;
        if operand.is_const() {
            let value = operand.eval_const()?;
            let Some(text) = value.as_str() else {
                return Err(Error::type_conversion(value, "String"));
            };

            let pattern = format!("{prefix}{}{suffix}", escape_like(text));
            fmt!(self, Arg(pattern.into()) " ESCAPE '\\'");
        } else {
            if !prefix.is_empty() {
                fmt!(self, "'%' || ");
            }
            self.scalar(operand)?;
            if !suffix.is_empty() {
                fmt!(self, " || '%'");
            }
        }

        Ok(())
    }

    /// `EXISTS` for `Any`, `NOT EXISTS` over the negated predicate for
    /// `All`.
    fn exists(&mut self, call: &ExprCall, all: bool) -> Result<()> {
        if all {
            fmt!(self, "NOT ");
        }

        fmt!(self, "EXISTS (SELECT 1");
        self.subquery(call, all)?;
        fmt!(self, ")");
        Ok(())
    }

    fn count(&mut self, call: &ExprCall) -> Result<()> {
        fmt!(self, "(SELECT COUNT(*)");
        self.subquery(call, false)?;
        fmt!(self, ")");
        Ok(())
    }

    /// ` FROM ... WHERE ...` of a combinator's correlated subquery.
    fn subquery(&mut self, call: &ExprCall, negate: bool) -> Result<()> {
        let catalog = self.builder.catalog;
        let source = self.source(&call.receiver)?;
        let element = catalog.expect_class(&source.element)?;
        let table = super::table(element)?;
        let owner_class = catalog.expect_class(&source.owner_class)?;

        let alias = self.alias();
        fmt!(self, " FROM " Ident(table) " AS " alias " WHERE " Column(alias, &source.foreign_key) " = ");

        // The owner's key: a column of an enclosing alias, or a subquery
        // when the owner is itself reached through navigation.
        let key_ty = owner_class
            .property(&owner_class.key)
            .map(|property| property.ty.clone())
            .unwrap_or(Type::Uuid);
        let owner_key = Expr::member(source.owner.clone(), owner_class.key.clone(), key_ty);
        self.scalar(&owner_key)?;

        let depth = self.scope.len();

        for filter in &source.filters {
            self.bind(filter, alias, &element.name)?;
            fmt!(self, " AND ");
            self.parenthesized_condition(&filter.body)?;
        }

        if let Some(lambda) = call.lambda() {
            self.bind(lambda, alias, &element.name)?;
            fmt!(self, " AND ");
            if negate {
                fmt!(self, "NOT ");
            }
            self.parenthesized_condition(&lambda.body)?;
        } else if negate {
            // All without a predicate holds vacuously
            fmt!(self, " AND 1 = 0");
        }

        self.scope.truncate(depth);
        Ok(())
    }

    fn source<'e>(&self, receiver: &'e Expr) -> Result<Source<'e>> {
        match receiver {
            Expr::Call(call) if call.method == Method::Where => {
                let mut source = self.source(&call.receiver)?;
                let lambda = call.lambda().ok_or_else(|| {
                    Error::invalid_operation("Where expects a lambda argument")
                })?;
                source.filters.push(lambda);
                Ok(source)
            }
            Expr::Member(member) => {
                let owner_class = self.class_of(&member.receiver)?;
                let property = owner_class
                    .property(&member.name)
                    .ok_or_else(|| Error::missing_member(&owner_class.name, &member.name))?;

                let (Some(Relation::HasMany { foreign_key }), Some(element)) =
                    (&property.relation, property.target())
                else {
                    return Err(Error::unsupported_feature(format!(
                        "`{}.{}` is not a collection navigation",
                        owner_class.name, member.name
                    )));
                };

                Ok(Source {
                    owner: &member.receiver,
                    owner_class: owner_class.name.clone(),
                    element: element.to_string(),
                    foreign_key: foreign_key.clone(),
                    filters: vec![],
                })
            }
            _ => Err(Error::unsupported_feature(
                "collection methods apply to collection navigations only",
            )),
        }
    }

    /// Serializes a property access: a column of an alias in scope, or a
    /// correlated subquery following scalar navigations.
    fn member(&mut self, member: &ExprMember) -> Result<()> {
        let mut hops = vec![member.name.as_str()];
        let mut receiver = &*member.receiver;

        let root = loop {
            match receiver {
                Expr::Member(inner) => {
                    hops.push(&inner.name);
                    receiver = &inner.receiver;
                }
                Expr::Param(param) => break self.resolve(param)?.clone(),
                _ => {
                    return Err(Error::unsupported_feature(
                        "member access on a computed value",
                    ))
                }
            }
        };
        hops.reverse();

        let catalog = self.builder.catalog;
        let (column, navigations) = hops.split_last().ok_or_else(|| {
            Error::invalid_operation("empty member path")
        })?;

        // Each navigation: the target class and the foreign key on the
        // class it is reached from.
        let mut class = catalog.expect_class(&root.class)?;
        let mut joins: Vec<(&Class, &str)> = vec![];

        for hop in navigations {
            let property = class
                .property(hop)
                .ok_or_else(|| Error::missing_member(&class.name, *hop))?;

            let (Some(Relation::BelongsTo { key }), Some(target)) =
                (&property.relation, property.target())
            else {
                return Err(Error::unsupported_feature(format!(
                    "`{}.{hop}` is not a scalar navigation",
                    class.name
                )));
            };

            joins.push((catalog.expect_class(target)?, key.as_str()));
            class = catalog.expect_class(target)?;
        }

        let property = class
            .property(column)
            .ok_or_else(|| Error::missing_member(&class.name, *column))?;

        // A scalar navigation in value position stands for its foreign key
        let column = match &property.relation {
            None => property.name.as_str(),
            Some(Relation::BelongsTo { key }) => key.as_str(),
            Some(Relation::HasMany { .. }) => {
                return Err(Error::unsupported_feature(format!(
                    "collection `{}.{}` used as a value",
                    class.name, property.name
                )))
            }
        };

        if joins.is_empty() {
            fmt!(self, Column(root.alias, column));
            return Ok(());
        }

        let aliases: Vec<Alias> = joins.iter().map(|_| self.alias()).collect();
        let last = aliases[aliases.len() - 1];

        fmt!(self, "(SELECT " Column(last, column) " FROM ");

        for (i, ((target, key), &alias)) in joins.iter().zip(&aliases).enumerate() {
            let table = super::table(target)?;

            if i == 0 {
                fmt!(self, Ident(table) " AS " alias);
            } else {
                let prev = aliases[i - 1];
                fmt!(self, " JOIN " Ident(table) " AS " alias " ON " Column(alias, &target.key) " = " Column(prev, key));
            }
        }

        let (first, first_key) = joins[0];
        fmt!(self, " WHERE " Column(aliases[0], &first.key) " = " Column(root.alias, first_key) ")");
        Ok(())
    }

    fn class_of(&self, expr: &Expr) -> Result<&Class> {
        let ty = expr.ty();
        let Some(class) = ty.as_class() else {
            return Err(Error::invalid_operation(format!(
                "expected a row type, found {ty:?}"
            )));
        };

        self.builder.catalog.expect_class(class)
    }

    fn bind(&mut self, lambda: &ExprLambda, alias: Alias, class: &str) -> Result<()> {
        let param = lambda
            .param()
            .ok_or_else(|| Error::invalid_operation("a lambda takes exactly one parameter"))?;

        self.scope.push(Binding {
            param: param.clone(),
            alias,
            class: class.to_string(),
        });
        Ok(())
    }

    fn resolve(&self, param: &ExprParam) -> Result<&Binding> {
        self.scope
            .iter()
            .rev()
            .find(|binding| binding.param == *param)
            .ok_or_else(|| Error::invalid_operation(format!("unbound parameter `{}`", param.name)))
    }

    fn keyword(&self, keyword: SqlKeyword) -> &'static str {
        self.builder.provider.create_sql_keyword(keyword)
    }
}

fn operand(call: &ExprCall) -> Result<&Expr> {
    call.args
        .first()
        .ok_or_else(|| Error::invalid_operation(format!("{} expects an argument", call.method)))
}

fn operator(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Eq => "=",
        BinaryOp::Ne => "<>",
        BinaryOp::Ge => ">=",
        BinaryOp::Gt => ">",
        BinaryOp::Le => "<=",
        BinaryOp::Lt => "<",
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
