use super::{Command, Connection, Row};
use crate::{stmt::Record, Result};

use std::{
    collections::{HashMap, HashSet},
    fmt,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Identity of a persisted object within a context: class and key.
pub type ObjectKey = (String, Uuid);

/// A unit of work over one physical connection.
///
/// A context is created per logical operation and dropped at its end. It is
/// not shared between threads. Dropping a context with an open transaction
/// rolls the transaction back.
pub struct DataContext {
    connection: Box<dyn Connection>,
    connection_string: String,
    read_only: bool,
    in_transaction: bool,

    /// Prepared commands keyed by backend-neutral SQL text
    commands: HashMap<String, Command>,

    /// Objects materialized by this context
    objects: HashMap<ObjectKey, Record>,

    /// Objects whose associations are being loaded
    loading: HashSet<ObjectKey>,
}

impl DataContext {
    pub fn new(
        connection: Box<dyn Connection>,
        connection_string: impl Into<String>,
        read_only: bool,
    ) -> DataContext {
        DataContext {
            connection,
            connection_string: connection_string.into(),
            read_only,
            in_transaction: false,
            commands: HashMap::new(),
            objects: HashMap::new(),
            loading: HashSet::new(),
        }
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    pub fn begin(&mut self) -> Result<()> {
        self.connection.begin()?;
        self.in_transaction = true;
        Ok(())
    }

    pub fn commit(&mut self) -> Result<()> {
        self.connection.commit()?;
        self.in_transaction = false;
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.in_transaction = false;
        self.connection.rollback()
    }

    pub fn execute(&mut self, command: &Command) -> Result<u64> {
        debug!(sql = %command.sql, params = command.params.len(), "execute");
        self.connection.execute(command)
    }

    pub fn query(&mut self, command: &Command) -> Result<Vec<Row>> {
        debug!(sql = %command.sql, params = command.params.len(), "query");
        self.connection.query(command)
    }

    /// The prepared command built earlier for `sql`.
    pub fn prepared_command(&mut self, sql: &str) -> Option<&mut Command> {
        self.commands.get_mut(sql)
    }

    pub fn store_command(&mut self, sql: impl Into<String>, command: Command) {
        self.commands.insert(sql.into(), command);
    }

    pub fn prepared_command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn cached_object(&self, class: &str, key: Uuid) -> Option<&Record> {
        self.objects.get(&(class.to_string(), key))
    }

    pub fn cache_object(&mut self, key: Uuid, record: Record) {
        self.objects.insert((record.class.clone(), key), record);
    }

    pub fn evict_object(&mut self, class: &str, key: Uuid) {
        self.objects.remove(&(class.to_string(), key));
    }

    /// Marks an object as being loaded. Returns false if it already was,
    /// which means the graph loops back on itself.
    pub fn begin_loading(&mut self, class: &str, key: Uuid) -> bool {
        self.loading.insert((class.to_string(), key))
    }

    pub fn end_loading(&mut self, class: &str, key: Uuid) {
        self.loading.remove(&(class.to_string(), key));
    }

    pub fn is_loading(&self, class: &str, key: Uuid) -> bool {
        self.loading.contains(&(class.to_string(), key))
    }
}

impl Drop for DataContext {
    fn drop(&mut self) {
        if self.in_transaction {
            if let Err(err) = self.connection.rollback() {
                warn!(error = %err, "rollback on drop failed");
            }
        }
    }
}

impl fmt::Debug for DataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataContext")
            .field("connection_string", &self.connection_string)
            .field("read_only", &self.read_only)
            .field("in_transaction", &self.in_transaction)
            .field("commands", &self.commands.len())
            .field("objects", &self.objects.len())
            .finish()
    }
}
