use postgres::{Client, Error, Statement};
use std::collections::HashMap;

/// Statements prepared on one connection, keyed by SQL text.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatementCache {
    map: HashMap<String, Statement>,
}

impl StatementCache {
    pub(crate) fn new() -> StatementCache {
        StatementCache::default()
    }

    pub(crate) fn get(&self, query: &str) -> Option<Statement> {
        self.map.get(query).cloned()
    }

    pub(crate) fn prepare(&mut self, client: &mut Client, query: &str) -> Result<Statement, Error> {
        if let Some(statement) = self.get(query) {
            return Ok(statement);
        }

        let statement = client.prepare(query)?;
        self.map.insert(query.to_string(), statement.clone());
        Ok(statement)
    }
}
