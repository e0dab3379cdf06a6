pub mod config;
pub use config::{ConfigSource, DataConfig};

pub mod db;
pub use db::connect;

mod mapper;
pub use mapper::ModelMapper;

pub mod persistence;
pub use persistence::{DataCache, Persistence};

pub mod registry;
pub use registry::{AutoLoad, Classifier, EntityDef, Navigation, Registry};

pub use relmap_core::{
    driver::{DataContext, Provider},
    schema::{Catalog, ClassMap, CollapseKey, ModelMap, PropertyMap},
    stmt, Error, Result,
};

pub use relmap_sql::QueryBuilder;

#[cfg(feature = "postgresql")]
pub use relmap_driver_postgresql::PostgreSQL;

#[cfg(feature = "sqlite")]
pub use relmap_driver_sqlite::Sqlite;
