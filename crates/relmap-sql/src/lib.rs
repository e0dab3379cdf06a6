mod builder;
pub use builder::{QueryBuilder, VersionCheck};

pub mod command;

pub mod placeholder;
pub use placeholder::Flavor;
