use crate::stmt::Value;

use std::sync::Arc;

/// One result row, with values as the backend returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub columns: Arc<[String]>,
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Row {
        debug_assert_eq!(columns.len(), values.len());
        Row { columns, values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.values.get(index)
    }

    /// Removes the value of `column`, leaving `Null` behind.
    pub fn take(&mut self, column: &str) -> Option<Value> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.values.get_mut(index).map(std::mem::take)
    }
}
