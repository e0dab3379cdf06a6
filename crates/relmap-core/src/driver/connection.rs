use super::{Command, Row};
use crate::Result;

/// A blocking, physical connection to a backend.
pub trait Connection: Send {
    /// Runs a statement, returning the number of affected rows.
    fn execute(&mut self, command: &Command) -> Result<u64>;

    /// Runs a query, returning every row with the backend's native values.
    fn query(&mut self, command: &Command) -> Result<Vec<Row>>;

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;
}
