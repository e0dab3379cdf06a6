use crate::config::DataConfig;

use relmap_core::{
    cache::StatementCache,
    driver::{Provider, ProviderConfig},
    Error, Result,
};
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Creates the provider the configured write connection points at.
///
/// The backend is chosen from the URL scheme. Both connection strings must
/// use the same one.
pub fn connect(config: &DataConfig) -> Result<Arc<dyn Provider>> {
    let provider_config = config.provider_config()?;
    let statements = Arc::new(StatementCache::new(config.statement_cache_capacity));

    let write = scheme(&provider_config.write_connection)?;
    let read = scheme(&provider_config.read_connection)?;

    if read != write {
        return Err(Error::invalid_connection_url(format!(
            "read and write connections use different backends; read={read}; write={write}"
        )));
    }

    let provider = match write.as_str() {
        "sqlite" => connect_sqlite(provider_config, statements)?,
        "postgresql" | "postgres" => connect_postgresql(provider_config, statements)?,
        scheme => {
            return Err(Error::invalid_connection_url(format!(
                "unsupported database; scheme={scheme}"
            )))
        }
    };

    info!(backend = %write, features = ?provider.features(), "created provider");
    Ok(provider)
}

fn scheme(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url}")))?;
    Ok(parsed.scheme().to_string())
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(
    config: ProviderConfig,
    statements: Arc<StatementCache>,
) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(relmap_driver_sqlite::Sqlite::new(config, statements)?))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(_: ProviderConfig, _: Arc<StatementCache>) -> Result<Arc<dyn Provider>> {
    Err(Error::unsupported_feature("`sqlite` feature not enabled"))
}

#[cfg(feature = "postgresql")]
fn connect_postgresql(
    config: ProviderConfig,
    statements: Arc<StatementCache>,
) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(relmap_driver_postgresql::PostgreSQL::new(
        config, statements,
    )?))
}

#[cfg(not(feature = "postgresql"))]
fn connect_postgresql(_: ProviderConfig, _: Arc<StatementCache>) -> Result<Arc<dyn Provider>> {
    Err(Error::unsupported_feature("`postgresql` feature not enabled"))
}
