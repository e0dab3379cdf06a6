use super::Value;

/// SQL text under construction, with `?` standing in for each bound
/// argument.
///
/// Builders consume the statement and return it extended; there is no way
/// to remove or edit a fragment once appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlStatement {
    fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq)]
enum Fragment {
    Sql(String),
    Arg(Value),

    /// Text that already carries its own `?` placeholders
    Raw(String, Vec<Value>),
}

/// The final SQL text and its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStatement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl SqlStatement {
    pub fn new() -> SqlStatement {
        SqlStatement::default()
    }

    /// A statement from raw text already containing `?` placeholders for
    /// `args`.
    pub fn raw(sql: impl Into<String>, args: impl IntoIterator<Item = Value>) -> SqlStatement {
        SqlStatement {
            fragments: vec![Fragment::Raw(sql.into(), args.into_iter().collect())],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn append(mut self, other: SqlStatement) -> SqlStatement {
        self.fragments.extend(other.fragments);
        self
    }

    pub fn append_sql(mut self, sql: impl Into<String>) -> SqlStatement {
        let sql = sql.into();

        if let Some(Fragment::Sql(last)) = self.fragments.last_mut() {
            last.push_str(&sql);
        } else if !sql.is_empty() {
            self.fragments.push(Fragment::Sql(sql));
        }

        self
    }

    /// Appends a `?` placeholder bound to `value`.
    pub fn arg(mut self, value: impl Into<Value>) -> SqlStatement {
        self.fragments.push(Fragment::Arg(value.into()));
        self
    }

    pub fn where_clause(self, condition: SqlStatement) -> SqlStatement {
        if condition.is_empty() {
            return self;
        }

        self.append_sql(" WHERE ").append(condition)
    }

    pub fn and(self, condition: SqlStatement) -> SqlStatement {
        self.join(" AND ", condition)
    }

    pub fn or(self, condition: SqlStatement) -> SqlStatement {
        self.join(" OR ", condition)
    }

    /// Wraps the statement in parentheses.
    pub fn parenthesize(self) -> SqlStatement {
        SqlStatement::new().append_sql("(").append(self).append_sql(")")
    }

    pub fn args(&self) -> impl Iterator<Item = &Value> {
        self.fragments.iter().flat_map(|fragment| match fragment {
            Fragment::Arg(value) => std::slice::from_ref(value),
            Fragment::Raw(_, args) => &args[..],
            Fragment::Sql(_) => &[],
        })
    }

    /// The SQL text with `?` placeholders.
    pub fn sql(&self) -> String {
        let mut sql = String::new();

        for fragment in &self.fragments {
            match fragment {
                Fragment::Sql(text) | Fragment::Raw(text, _) => sql.push_str(text),
                Fragment::Arg(_) => sql.push('?'),
            }
        }

        sql
    }

    pub fn build(&self) -> BuiltStatement {
        BuiltStatement {
            sql: self.sql(),
            args: self.args().cloned().collect(),
        }
    }

    fn join(self, separator: &str, condition: SqlStatement) -> SqlStatement {
        match (self.is_empty(), condition.is_empty()) {
            (_, true) => self,
            (true, false) => condition,
            (false, false) => self.append_sql(separator).append(condition),
        }
    }
}

impl BuiltStatement {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> BuiltStatement {
        BuiltStatement {
            sql: sql.into(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_text_and_arguments_in_order() {
        let stmt = SqlStatement::new()
            .append_sql("SELECT t0.key FROM patient AS t0")
            .where_clause(
                SqlStatement::new()
                    .append_sql("t0.family = ")
                    .arg("Smith")
                    .and(SqlStatement::new().append_sql("t0.age > ").arg(40i64)),
            );

        let built = stmt.build();
        assert_eq!(
            built.sql,
            "SELECT t0.key FROM patient AS t0 WHERE t0.family = ? AND t0.age > ?"
        );
        assert_eq!(built.args, vec![Value::from("Smith"), Value::I64(40)]);
    }

    #[test]
    fn empty_condition_adds_nothing() {
        let stmt = SqlStatement::new()
            .append_sql("SELECT 1")
            .where_clause(SqlStatement::new());
        assert_eq!(stmt.sql(), "SELECT 1");

        let cond = SqlStatement::new().and(SqlStatement::new().append_sql("a = 1"));
        assert_eq!(cond.sql(), "a = 1");
    }

    #[test]
    fn raw_text_keeps_its_placeholders() {
        let stmt = SqlStatement::raw("SELECT * FROM t WHERE a = ? AND b = ?", [1i64.into(), 2i64.into()])
            .append_sql(" LIMIT ")
            .arg(10i64);

        let built = stmt.build();
        assert_eq!(built.sql, "SELECT * FROM t WHERE a = ? AND b = ? LIMIT ?");
        assert_eq!(built.args.len(), 3);
    }
}
