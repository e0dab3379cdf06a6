use crate::value::{self, Param};

use relmap_core::{
    driver::{Command, CommandKind, Row},
    Error, Result,
};
use rusqlite::{params_from_iter, Connection as RusqliteConnection, OpenFlags};
use std::{path::Path, sync::Arc, time::Duration};

/// How long a statement waits on a database locked by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A physical SQLite connection.
///
/// Statements are prepared through rusqlite's own cache, keyed by SQL text,
/// so a command run repeatedly is compiled once per connection.
#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    pub fn in_memory() -> Result<Connection> {
        let connection = RusqliteConnection::open_in_memory().map_err(Error::driver)?;
        Ok(Connection { connection })
    }

    pub fn open<P: AsRef<Path>>(path: P, read_only: bool) -> Result<Connection> {
        let flags = if read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::default()
        };

        let connection = RusqliteConnection::open_with_flags(path, flags).map_err(Error::driver)?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(Error::driver)?;

        Ok(Connection { connection })
    }

    fn batch(&mut self, sql: &str) -> Result<()> {
        self.connection.execute_batch(sql).map_err(Error::driver)
    }
}

impl relmap_core::Connection for Connection {
    fn execute(&mut self, command: &Command) -> Result<u64> {
        check_kind(command)?;

        let mut stmt = self
            .connection
            .prepare_cached(&command.sql)
            .map_err(Error::driver)?;

        let count = stmt
            .execute(params_from_iter(command.params.iter().map(Param)))
            .map_err(Error::driver)?;

        Ok(count as u64)
    }

    fn query(&mut self, command: &Command) -> Result<Vec<Row>> {
        check_kind(command)?;

        let mut stmt = self
            .connection
            .prepare_cached(&command.sql)
            .map_err(Error::driver)?;

        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt
            .query(params_from_iter(command.params.iter().map(Param)))
            .map_err(Error::driver)?;

        let mut ret = vec![];

        while let Some(row) = rows.next().map_err(Error::driver)? {
            let mut values = Vec::with_capacity(columns.len());

            for index in 0..columns.len() {
                let value = row.get_ref(index).map_err(Error::driver)?;
                values.push(value::from_sql(value)?);
            }

            ret.push(Row::new(columns.clone(), values));
        }

        Ok(ret)
    }

    fn begin(&mut self) -> Result<()> {
        self.batch("BEGIN")
    }

    fn commit(&mut self) -> Result<()> {
        self.batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        self.batch("ROLLBACK")
    }
}

fn check_kind(command: &Command) -> Result<()> {
    match command.kind {
        CommandKind::Text => Ok(()),
        CommandKind::StoredProcedure => Err(Error::unsupported_feature(
            "SQLite has no stored procedures",
        )),
    }
}
