use relmap_core::{driver::ProviderConfig, Error, Result};

use serde::Deserialize;
use std::collections::HashMap;

/// Looks up a named configuration section.
pub trait ConfigSource {
    fn section(&self, name: &str) -> Option<serde_json::Value>;
}

impl ConfigSource for serde_json::Value {
    fn section(&self, name: &str) -> Option<serde_json::Value> {
        self.get(name).cloned()
    }
}

impl ConfigSource for HashMap<String, serde_json::Value> {
    fn section(&self, name: &str) -> Option<serde_json::Value> {
        self.get(name).cloned()
    }
}

/// Settings of the data layer.
///
/// ```json
/// {
///   "connectionStrings": { "main": "sqlite:/var/lib/app/main.db" },
///   "readWriteConnection": "main",
///   "autoInsertChildren": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataConfig {
    /// Connection strings by name
    pub connection_strings: HashMap<String, String>,

    /// Name of the connection string reads go to. Defaults to the
    /// read-write one.
    #[serde(default)]
    pub read_only_connection: Option<String>,

    pub read_write_connection: String,

    /// Whether `ensure_exists` inserts referenced objects that are not yet
    /// persisted
    #[serde(default)]
    pub auto_insert_children: bool,

    #[serde(default = "default_statement_cache_capacity")]
    pub statement_cache_capacity: usize,

    #[serde(default = "default_classifier_cache_capacity")]
    pub classifier_cache_capacity: usize,
}

fn default_statement_cache_capacity() -> usize {
    1024
}

fn default_classifier_cache_capacity() -> usize {
    4096
}

impl DataConfig {
    /// Settings reading and writing the database at `url`.
    pub fn single(url: impl Into<String>) -> DataConfig {
        DataConfig {
            connection_strings: HashMap::from([("main".to_string(), url.into())]),
            read_only_connection: None,
            read_write_connection: "main".to_string(),
            auto_insert_children: false,
            statement_cache_capacity: default_statement_cache_capacity(),
            classifier_cache_capacity: default_classifier_cache_capacity(),
        }
    }

    /// Reads the settings from the section `name` of `source`.
    pub fn from_source(source: &dyn ConfigSource, name: &str) -> Result<DataConfig> {
        let section = source
            .section(name)
            .ok_or_else(|| Error::invalid_mapping(format!("missing configuration section `{name}`")))?;

        let config: DataConfig = serde_json::from_value(section)
            .map_err(|err| Error::from(err).context(Error::invalid_mapping(format!("section `{name}`"))))?;

        config.provider_config()?;
        Ok(config)
    }

    pub fn auto_insert_children(mut self, enabled: bool) -> DataConfig {
        self.auto_insert_children = enabled;
        self
    }

    /// Resolves the named connections into connection strings.
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let write = self.connection_string(&self.read_write_connection)?;
        let read = match &self.read_only_connection {
            Some(name) => self.connection_string(name)?,
            None => write.clone(),
        };

        Ok(ProviderConfig {
            read_connection: read,
            write_connection: write,
        })
    }

    fn connection_string(&self, name: &str) -> Result<String> {
        self.connection_strings.get(name).cloned().ok_or_else(|| {
            Error::invalid_connection_url(format!("no connection string named `{name}`"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_only_defaults_to_write() {
        let source = json!({
            "data": {
                "connectionStrings": { "main": "sqlite::memory:" },
                "readWriteConnection": "main"
            }
        });

        let config = DataConfig::from_source(&source, "data").unwrap();
        assert!(!config.auto_insert_children);
        assert_eq!(config.statement_cache_capacity, 1024);
        assert_eq!(
            config.provider_config().unwrap(),
            ProviderConfig::single("sqlite::memory:")
        );
    }

    #[test]
    fn separate_read_connection() {
        let mut source = HashMap::new();
        source.insert(
            "data".to_string(),
            json!({
                "connectionStrings": {
                    "primary": "postgresql://db-primary/app",
                    "replica": "postgresql://db-replica/app"
                },
                "readOnlyConnection": "replica",
                "readWriteConnection": "primary",
                "autoInsertChildren": true
            }),
        );

        let config = DataConfig::from_source(&source, "data").unwrap();
        let provider = config.provider_config().unwrap();
        assert!(config.auto_insert_children);
        assert_eq!(provider.read_connection, "postgresql://db-replica/app");
        assert_eq!(provider.write_connection, "postgresql://db-primary/app");
    }

    #[test]
    fn missing_section() {
        let err = DataConfig::from_source(&json!({}), "data").unwrap_err();
        assert!(err.is_invalid_mapping());
    }

    #[test]
    fn unknown_connection_name() {
        let source = json!({
            "data": {
                "connectionStrings": {},
                "readWriteConnection": "main"
            }
        });

        let err = DataConfig::from_source(&source, "data").unwrap_err();
        assert!(err.is_invalid_connection_url());
    }
}
