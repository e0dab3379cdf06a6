//! Command construction shared by the providers.

use crate::placeholder::{self, Flavor};

use relmap_core::{
    cache::StatementCache,
    driver::{Command, DataContext, Provider},
    stmt::{SqlStatement, Value},
    Error, Result,
};
use tracing::{debug, trace};

/// Builds the command for `stmt`.
///
/// Arguments are encoded through the provider's codec. When the context
/// already holds a command for the same SQL text its values are rebound;
/// otherwise the placeholders are counted against the arguments and
/// rewritten into the backend's syntax.
pub fn create_command(
    provider: &dyn Provider,
    cx: &mut DataContext,
    stmt: &SqlStatement,
    flavor: Flavor,
    statements: &StatementCache,
) -> Result<Command> {
    let built = stmt.build();
    let params = encode(provider, built.args)?;

    if let Some(command) = cx.prepared_command(&built.sql) {
        if command.params.len() != params.len() {
            return Err(Error::argument_count_mismatch(
                command.params.len(),
                params.len(),
            ));
        }

        trace!(sql = %command.sql, "reusing prepared command");
        command.rebind(params);
        return Ok(command.clone());
    }

    let placeholders = placeholder::count(&built.sql);
    if placeholders != params.len() {
        return Err(Error::argument_count_mismatch(placeholders, params.len()));
    }

    let sql = statements.get_or_insert_with(built.sql.clone(), || {
        placeholder::rewrite(&built.sql, flavor)
    });

    debug!(sql = %sql, "created command");

    let command = Command::text(sql, params);
    cx.store_command(built.sql, command.clone());
    Ok(command)
}

/// Builds a command from raw SQL text with `?` placeholders.
pub fn create_raw_command(
    provider: &dyn Provider,
    cx: &mut DataContext,
    sql: &str,
    params: Vec<Value>,
    flavor: Flavor,
    statements: &StatementCache,
) -> Result<Command> {
    create_command(
        provider,
        cx,
        &SqlStatement::raw(sql, params),
        flavor,
        statements,
    )
}

pub fn encode(provider: &dyn Provider, values: Vec<Value>) -> Result<Vec<Value>> {
    values
        .into_iter()
        .map(|value| provider.encode_value(value))
        .collect()
}
