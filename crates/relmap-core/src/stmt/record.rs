use super::{LoadState, Value};

use indexmap::IndexMap;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A business object or a relational row.
///
/// Both sides of the mapping share this runtime shape: a class name and an
/// ordered set of named values. Navigation properties hold nested records
/// (or lists of records) once they have been loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub class: String,
    pub fields: IndexMap<String, Value>,
    pub load_state: LoadState,
}

impl Record {
    pub fn new(class: impl Into<String>) -> Record {
        Record {
            class: class.into(),
            fields: IndexMap::new(),
            load_state: LoadState::New,
        }
    }

    /// Builder-style field assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Record {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns the named field, or `Null` when it is absent.
    pub fn get(&self, name: &str) -> &Value {
        const NULL: &Value = &Value::Null;
        self.fields.get(name).unwrap_or(NULL)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    pub fn get_uuid(&self, name: &str) -> Option<Uuid> {
        self.get(name).as_uuid()
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).as_i64()
    }
}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class.hash(state);
        for (name, value) in &self.fields {
            name.hash(state);
            value.hash(state);
        }
    }
}
