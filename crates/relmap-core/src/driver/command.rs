use crate::stmt::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Text,
    StoredProcedure,
}

/// SQL in the backend's own placeholder syntax with parameters already
/// encoded for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub sql: String,
    pub params: Vec<Value>,
    pub kind: CommandKind,
}

impl Command {
    pub fn text(sql: impl Into<String>, params: Vec<Value>) -> Command {
        Command {
            sql: sql.into(),
            params,
            kind: CommandKind::Text,
        }
    }

    pub fn stored_procedure(sql: impl Into<String>, params: Vec<Value>) -> Command {
        Command {
            sql: sql.into(),
            params,
            kind: CommandKind::StoredProcedure,
        }
    }

    /// Replaces the parameter values, keeping the command's shape.
    pub fn rebind(&mut self, params: Vec<Value>) {
        self.params = params;
    }
}
