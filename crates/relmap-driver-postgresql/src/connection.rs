use crate::{
    statement_cache::StatementCache,
    value::{self, Param},
};

use postgres::{types::ToSql, Client, Statement};
use relmap_core::{
    driver::{Command, Row},
    Error, Result,
};
use std::{fmt, sync::Arc};

/// A physical PostgreSQL connection with the statements prepared on it.
pub struct Connection {
    client: Client,
    statements: StatementCache,
}

impl Connection {
    pub fn new(client: Client) -> Connection {
        Connection {
            client,
            statements: StatementCache::new(),
        }
    }

    fn prepare(&mut self, sql: &str) -> Result<Statement> {
        self.statements
            .prepare(&mut self.client, sql)
            .map_err(Error::driver)
    }
}

impl relmap_core::Connection for Connection {
    fn execute(&mut self, command: &Command) -> Result<u64> {
        let statement = self.prepare(&command.sql)?;
        let params = params(command);

        self.client
            .execute(&statement, &refs(&params))
            .map_err(Error::driver)
    }

    fn query(&mut self, command: &Command) -> Result<Vec<Row>> {
        let statement = self.prepare(&command.sql)?;
        let params = params(command);

        let rows = self
            .client
            .query(&statement, &refs(&params))
            .map_err(Error::driver)?;

        let columns: Arc<[String]> = statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();

        rows.iter()
            .map(|row| {
                let values = (0..columns.len())
                    .map(|index| value::from_sql(row, index))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Row::new(columns.clone(), values))
            })
            .collect()
    }

    fn begin(&mut self) -> Result<()> {
        self.client.batch_execute("BEGIN").map_err(Error::driver)
    }

    fn commit(&mut self) -> Result<()> {
        self.client.batch_execute("COMMIT").map_err(Error::driver)
    }

    fn rollback(&mut self) -> Result<()> {
        self.client.batch_execute("ROLLBACK").map_err(Error::driver)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.client.is_closed())
            .finish()
    }
}

fn params(command: &Command) -> Vec<Param<'_>> {
    command.params.iter().map(Param).collect()
}

fn refs<'a>(params: &'a [Param<'a>]) -> Vec<&'a (dyn ToSql + Sync)> {
    params
        .iter()
        .map(|param| param as &(dyn ToSql + Sync))
        .collect()
}
