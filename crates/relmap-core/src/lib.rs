pub mod cache;
pub use cache::Cache;

pub mod driver;
pub use driver::{Connection, DataContext, Provider};

mod error;
pub use error::Error;

pub mod schema;
pub use schema::Catalog;

pub mod stmt;

/// A Result type alias that uses relmap's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
