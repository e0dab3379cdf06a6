mod command;
pub use command::{Command, CommandKind};

mod connection;
pub use connection::Connection;

mod context;
pub use context::{DataContext, ObjectKey};

mod features;
pub use features::Features;

mod keyword;
pub use keyword::SqlKeyword;

mod lock;
pub use lock::{LockToken, WriterLock};

mod row;
pub use row::Row;

use crate::{
    stmt::{SqlStatement, Type, Value},
    Result,
};

use std::fmt::Debug;

/// The two connection strings a provider opens contexts against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub read_connection: String,
    pub write_connection: String,
}

impl ProviderConfig {
    /// Reads and writes go to the same database.
    pub fn single(connection: impl Into<String>) -> ProviderConfig {
        let connection = connection.into();
        ProviderConfig {
            read_connection: connection.clone(),
            write_connection: connection,
        }
    }
}

/// A relational backend.
///
/// This is the only interface query builders and persistence services
/// depend on. Everything dialect specific sits behind it: placeholder
/// syntax, value representation, `RETURNING` and locking.
pub trait Provider: Debug + Send + Sync + 'static {
    /// What the backend generates on its own.
    fn features(&self) -> Features;

    fn config(&self) -> &ProviderConfig;

    /// Opens a context on the read connection string.
    fn readonly_connection(&self) -> Result<DataContext>;

    /// Opens a context on the write connection string.
    fn write_connection(&self) -> Result<DataContext>;

    /// Builds an executable command from a statement, reusing the context's
    /// prepared command for identical SQL text.
    fn create_command(&self, cx: &mut DataContext, stmt: &SqlStatement) -> Result<Command>;

    /// Builds a command from raw SQL with `?` placeholders.
    fn create_raw_command(
        &self,
        cx: &mut DataContext,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Command>;

    /// Builds a call of a stored procedure.
    fn create_stored_procedure_command(
        &self,
        cx: &mut DataContext,
        name: &str,
        params: Vec<Value>,
    ) -> Result<Command>;

    /// Wraps `stmt` so it yields the number of rows it would return.
    fn count(&self, stmt: SqlStatement) -> SqlStatement {
        SqlStatement::new()
            .append_sql("SELECT COUNT(*) FROM (")
            .append(stmt)
            .append_sql(") AS Q0")
    }

    /// Wraps `stmt` so it yields a single boolean: whether it returns any
    /// row.
    fn exists(&self, stmt: SqlStatement) -> SqlStatement;

    /// Appends syntax returning `columns` from an insert. Backends without
    /// the feature return the statement unchanged.
    fn returning(&self, stmt: SqlStatement, columns: &[&str]) -> SqlStatement;

    /// The backend's spelling of `keyword`.
    ///
    /// Case sensitivity of `Like` follows the backend: PostgreSQL matches
    /// case-sensitively like the in-memory evaluator, while SQLite's `LIKE`
    /// ignores ASCII case, so `Like`, `StartsWith`, `EndsWith` and
    /// `Contains` match case-insensitively there.
    fn create_sql_keyword(&self, keyword: SqlKeyword) -> &'static str;

    /// Turns a value read from the backend into a value of `ty`.
    fn convert_value(&self, value: Value, ty: &Type) -> Result<Value>;

    /// Turns a value into the representation the backend stores.
    fn encode_value(&self, value: Value) -> Result<Value>;

    /// Serializes writers on `cx`'s connection string where the backend
    /// requires it.
    fn lock(&self, cx: &DataContext) -> LockToken;
}
