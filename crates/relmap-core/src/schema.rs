mod catalog;
pub use catalog::{Catalog, Class, Property, Relation};

pub mod mapping;
pub use mapping::{ClassMap, CollapseKey, ModelMap, PropertyMap};

mod verify;
