mod associations;

mod data_cache;
pub use data_cache::DataCache;

mod identity;

mod table;

use crate::{config::DataConfig, db, mapper::ModelMapper, registry::Registry};

use relmap_core::{
    cache::ClassifierCache,
    driver::{DataContext, Provider},
    Result,
};
use relmap_sql::QueryBuilder;
use std::{fmt, sync::Arc};

/// Business property holding the current version's key.
pub const VERSION_KEY: &str = "version_key";

/// Business property counting the versions of an object.
pub const VERSION_SEQUENCE: &str = "version_sequence";

/// Business property set once an object is superseded.
pub const OBSOLETION_TIME: &str = "obsoletion_time";

/// Association row property: first parent version the row belongs to.
pub const EFFECTIVE_VERSION_SEQUENCE: &str = "effective_version_sequence";

/// Association row property: parent version that superseded the row.
pub const OBSOLETE_VERSION_SEQUENCE: &str = "obsolete_version_sequence";

/// Loads and stores business objects through a provider.
///
/// Every operation runs on a caller-supplied [`DataContext`], which scopes
/// its transaction and the objects it has already materialized. The
/// service itself is shared between threads.
#[derive(Clone)]
pub struct Persistence {
    provider: Arc<dyn Provider>,
    mapper: Arc<ModelMapper>,
    registry: Arc<Registry>,
    auto_insert_children: bool,
    classifiers: Arc<ClassifierCache>,
    data_cache: Option<Arc<dyn DataCache>>,
}

impl Persistence {
    pub fn new(provider: Arc<dyn Provider>, mapper: Arc<ModelMapper>) -> Persistence {
        Persistence {
            provider,
            mapper,
            registry: Arc::new(Registry::new()),
            auto_insert_children: false,
            classifiers: Arc::new(ClassifierCache::new(4096)),
            data_cache: None,
        }
    }

    /// Connects the configured provider and applies the configured
    /// settings.
    pub fn from_config(
        config: &DataConfig,
        mapper: Arc<ModelMapper>,
        registry: Arc<Registry>,
    ) -> Result<Persistence> {
        let provider = db::connect(config)?;

        Ok(Persistence::new(provider, mapper)
            .registry(registry)
            .auto_insert_children(config.auto_insert_children)
            .classifier_cache(Arc::new(ClassifierCache::new(
                config.classifier_cache_capacity,
            ))))
    }

    pub fn registry(mut self, registry: Arc<Registry>) -> Persistence {
        self.registry = registry;
        self
    }

    pub fn auto_insert_children(mut self, enabled: bool) -> Persistence {
        self.auto_insert_children = enabled;
        self
    }

    pub fn classifier_cache(mut self, cache: Arc<ClassifierCache>) -> Persistence {
        self.classifiers = cache;
        self
    }

    pub fn data_cache(mut self, cache: Arc<dyn DataCache>) -> Persistence {
        self.data_cache = Some(cache);
        self
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn mapper(&self) -> &ModelMapper {
        &self.mapper
    }

    pub fn classifiers(&self) -> &ClassifierCache {
        &self.classifiers
    }

    /// Opens a context on the read connection.
    pub fn readonly_context(&self) -> Result<DataContext> {
        self.provider.readonly_connection()
    }

    /// Opens a context on the write connection.
    pub fn write_context(&self) -> Result<DataContext> {
        self.provider.write_connection()
    }

    fn builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self.mapper.catalog(), &*self.provider)
    }
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence")
            .field("provider", &self.provider)
            .field("auto_insert_children", &self.auto_insert_children)
            .field("classifiers", &self.classifiers.len())
            .field("data_cache", &self.data_cache.is_some())
            .finish()
    }
}
