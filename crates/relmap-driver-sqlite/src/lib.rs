mod connection;
pub use connection::Connection;

pub mod value;

use relmap_core::{
    cache::StatementCache,
    driver::{
        Command, DataContext, Features, LockToken, Provider, ProviderConfig, SqlKeyword,
        WriterLock,
    },
    stmt::{SqlStatement, Type, Value},
    Error, Result,
};
use relmap_sql::{command, Flavor};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::debug;
use url::Url;

/// Where a connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    File(PathBuf),

    /// A private database per connection.
    InMemory,
}

impl Database {
    /// Parses a `sqlite:` connection URL.
    pub fn parse(url: &str) -> Result<Database> {
        let parsed = Url::parse(url)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url}")))?;

        if parsed.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={url}"
            )));
        }

        match parsed.path() {
            ":memory:" => Ok(Database::InMemory),
            "" => Err(Error::invalid_connection_url(format!(
                "missing database path; url={url}"
            ))),
            path => Ok(Database::File(PathBuf::from(path))),
        }
    }

    fn connect(&self, read_only: bool) -> Result<Connection> {
        match self {
            Database::File(path) => Connection::open(path, read_only),
            Database::InMemory => Connection::in_memory(),
        }
    }
}

/// The SQLite provider.
///
/// SQLite allows one writer at a time, so [`Provider::lock`] hands out a
/// token per connection string that callers hold while writing.
#[derive(Debug)]
pub struct Sqlite {
    config: ProviderConfig,
    read: Database,
    write: Database,
    statements: Arc<StatementCache>,
    writers: Mutex<HashMap<String, Arc<WriterLock>>>,
}

impl Sqlite {
    pub fn new(config: ProviderConfig, statements: Arc<StatementCache>) -> Result<Sqlite> {
        let read = Database::parse(&config.read_connection)?;
        let write = Database::parse(&config.write_connection)?;

        Ok(Sqlite {
            config,
            read,
            write,
            statements,
            writers: Mutex::new(HashMap::new()),
        })
    }

    /// A provider reading and writing the database at `url`.
    pub fn open(url: impl Into<String>) -> Result<Sqlite> {
        Sqlite::new(
            ProviderConfig::single(url),
            Arc::new(StatementCache::new(1024)),
        )
    }

    pub fn statements(&self) -> &Arc<StatementCache> {
        &self.statements
    }

    fn context(&self, database: &Database, url: &str, read_only: bool) -> Result<DataContext> {
        let connection = database.connect(read_only)?;
        debug!(url, read_only, "opened SQLite connection");
        Ok(DataContext::new(Box::new(connection), url, read_only))
    }
}

impl Provider for Sqlite {
    fn features(&self) -> Features {
        Features::NONE
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn readonly_connection(&self) -> Result<DataContext> {
        self.context(&self.read, &self.config.read_connection, true)
    }

    fn write_connection(&self) -> Result<DataContext> {
        self.context(&self.write, &self.config.write_connection, false)
    }

    fn create_command(&self, cx: &mut DataContext, stmt: &SqlStatement) -> Result<Command> {
        command::create_command(self, cx, stmt, Flavor::Sqlite, &self.statements)
    }

    fn create_raw_command(
        &self,
        cx: &mut DataContext,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Command> {
        command::create_raw_command(self, cx, sql, params, Flavor::Sqlite, &self.statements)
    }

    fn create_stored_procedure_command(
        &self,
        _cx: &mut DataContext,
        name: &str,
        _params: Vec<Value>,
    ) -> Result<Command> {
        Err(Error::unsupported_feature(format!(
            "SQLite has no stored procedures; procedure={name}"
        )))
    }

    fn exists(&self, stmt: SqlStatement) -> SqlStatement {
        SqlStatement::new()
            .append_sql("SELECT EXISTS (")
            .append(stmt)
            .append_sql(")")
    }

    fn returning(&self, stmt: SqlStatement, _columns: &[&str]) -> SqlStatement {
        stmt
    }

    fn create_sql_keyword(&self, keyword: SqlKeyword) -> &'static str {
        match keyword {
            SqlKeyword::Lower => "LOWER",
            SqlKeyword::Upper => "UPPER",
            // LIKE ignores ASCII case, so both match case-insensitively
            SqlKeyword::Like | SqlKeyword::ILike => "LIKE",
        }
    }

    fn convert_value(&self, value: Value, ty: &Type) -> Result<Value> {
        value::decode(value, ty)
    }

    fn encode_value(&self, value: Value) -> Result<Value> {
        value::encode(value)
    }

    fn lock(&self, cx: &DataContext) -> LockToken {
        let lock = self
            .writers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(cx.connection_string().to_string())
            .or_default()
            .clone();

        lock.acquire()
    }
}
