#[macro_use]
mod fmt;
use fmt::{Alias, Arg, Column, Comma, Ident, ToSql};

mod expr;

use relmap_core::{
    driver::Provider,
    schema::Class,
    stmt::{ExprLambda, ExprParam, Record, SqlStatement, Value},
    Catalog, Error, Result,
};

/// Compiles relational predicates and row writes into [`SqlStatement`]s.
///
/// Every table in a statement is aliased: the statement's own table is
/// `t0` and nested subqueries count up from there.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    catalog: &'a Catalog,
    provider: &'a dyn Provider,
}

/// Optimistic concurrency check for an update.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionCheck {
    /// Column holding the version key
    pub key_column: String,

    /// Version key the row must currently carry
    pub expected: Value,

    /// Column incremented by the update, if any
    pub sequence_column: Option<String>,
}

struct Formatter<'a> {
    builder: QueryBuilder<'a>,

    /// Where to write the serialized SQL
    dst: String,

    /// Arguments, in placeholder order
    args: Vec<Value>,

    /// Lambda parameters in scope, innermost last
    scope: Vec<Binding>,

    next_alias: usize,
}

#[derive(Debug, Clone)]
struct Binding {
    param: ExprParam,
    alias: Alias,
    class: String,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(catalog: &'a Catalog, provider: &'a dyn Provider) -> QueryBuilder<'a> {
        QueryBuilder { catalog, provider }
    }

    /// `SELECT` every column of the predicate's row class, filtered by the
    /// predicate.
    pub fn select(&self, predicate: &ExprLambda) -> Result<SqlStatement> {
        let param = predicate.param().ok_or_else(|| {
            Error::invalid_operation("a predicate takes exactly one parameter")
        })?;
        let class = self.row_class_of(param)?;

        let mut f = self.formatter();
        let alias = f.alias();
        f.select_columns(class, alias);
        f.scope.push(Binding {
            param: param.clone(),
            alias,
            class: class.name.clone(),
        });

        fmt!(&mut f, " WHERE ");
        f.condition(&predicate.body)?;
        Ok(f.finish())
    }

    /// `SELECT` every row of `class`.
    pub fn select_all(&self, class: &str) -> Result<SqlStatement> {
        let class = self.row_class(class)?;

        let mut f = self.formatter();
        let alias = f.alias();
        f.select_columns(class, alias);
        Ok(f.finish())
    }

    /// `SELECT` the row of `class` with primary key `key`.
    pub fn select_by_key(&self, class: &str, key: impl Into<Value>) -> Result<SqlStatement> {
        let class = self.row_class(class)?;

        let mut f = self.formatter();
        let alias = f.alias();
        f.select_columns(class, alias);
        fmt!(&mut f, " WHERE " Column(alias, &class.key) " = " Arg(key.into()));
        Ok(f.finish())
    }

    /// `INSERT` the scalar fields present in `record`.
    pub fn insert(&self, record: &Record) -> Result<SqlStatement> {
        let class = self.row_class(&record.class)?;
        let table = table(class)?;

        let columns: Vec<_> = class
            .scalar_properties()
            .filter(|property| record.fields.contains_key(&property.name))
            .map(|property| property.name.as_str())
            .collect();

        let mut f = self.formatter();
        fmt!(&mut f, "INSERT INTO " Ident(table) " (" Comma(columns.iter().map(Ident)) ") VALUES (");
        fmt!(&mut f, Comma(columns.iter().map(|column| Arg(record.get(column).clone()))) ")");
        Ok(f.finish())
    }

    /// `UPDATE` the scalar fields present in `record`, identified by its
    /// primary key and, with `version`, by its current version key.
    pub fn update(&self, record: &Record, version: Option<&VersionCheck>) -> Result<SqlStatement> {
        let class = self.row_class(&record.class)?;
        let table = table(class)?;
        let key = record.get(&class.key).clone();

        if key.is_null() {
            return Err(Error::invalid_operation(format!(
                "cannot update `{}` without a key",
                class.name
            )));
        }

        let sequence = version.and_then(|version| version.sequence_column.as_deref());

        let columns: Vec<_> = class
            .scalar_properties()
            .filter(|property| property.name != class.key)
            .filter(|property| Some(property.name.as_str()) != sequence)
            .filter(|property| record.fields.contains_key(&property.name))
            .map(|property| property.name.as_str())
            .collect();

        let mut f = self.formatter();
        fmt!(&mut f, "UPDATE " Ident(table) " SET ");

        let mut s = "";
        for column in columns {
            fmt!(&mut f, s Ident(column) " = " Arg(record.get(column).clone()));
            s = ", ";
        }

        if let Some(sequence) = sequence {
            fmt!(&mut f, s Ident(sequence) " = " Ident(sequence) " + 1");
        }

        fmt!(&mut f, " WHERE " Ident(&class.key) " = " Arg(key));

        match version {
            Some(version) if version.expected.is_null() => {
                fmt!(&mut f, " AND " Ident(&version.key_column) " IS NULL");
            }
            Some(version) => {
                fmt!(&mut f, " AND " Ident(&version.key_column) " = " Arg(version.expected.clone()));
            }
            None => {}
        }

        Ok(f.finish())
    }

    /// `DELETE` the row of `class` with primary key `key`.
    pub fn delete(&self, class: &str, key: impl Into<Value>) -> Result<SqlStatement> {
        let class = self.row_class(class)?;
        let table = table(class)?;

        let mut f = self.formatter();
        fmt!(&mut f, "DELETE FROM " Ident(table) " WHERE " Ident(&class.key) " = " Arg(key.into()));
        Ok(f.finish())
    }

    fn formatter(&self) -> Formatter<'a> {
        Formatter {
            builder: *self,
            dst: String::new(),
            args: vec![],
            scope: vec![],
            next_alias: 0,
        }
    }

    fn row_class_of(&self, param: &ExprParam) -> Result<&'a Class> {
        let Some(class) = param.ty.as_class() else {
            return Err(Error::invalid_operation(format!(
                "predicate parameter `{}` is not a row type",
                param.name
            )));
        };

        self.row_class(class)
    }

    fn row_class(&self, name: &str) -> Result<&'a Class> {
        let class = self.catalog.expect_class(name)?;
        table(class)?;
        Ok(class)
    }
}

impl Formatter<'_> {
    fn alias(&mut self) -> Alias {
        let alias = Alias(self.next_alias);
        self.next_alias += 1;
        alias
    }

    fn select_columns(&mut self, class: &Class, alias: Alias) {
        let columns = class
            .scalar_properties()
            .map(|property| Column(alias, &property.name));

        // Checked by `row_class`
        let table = class.table.as_deref().unwrap_or_default();

        fmt!(self, "SELECT " Comma(columns) " FROM " Ident(table) " AS " alias);
    }

    fn finish(self) -> SqlStatement {
        SqlStatement::raw(self.dst, self.args)
    }
}

fn table(class: &Class) -> Result<&str> {
    class.table.as_deref().ok_or_else(|| {
        Error::invalid_operation(format!("class `{}` is not a relational row", class.name))
    })
}
