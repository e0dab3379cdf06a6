mod class_map;
pub use class_map::ClassMap;

mod collapse_key;
pub use collapse_key::CollapseKey;

mod property_map;
pub use property_map::PropertyMap;

use super::Catalog;
use crate::Result;

use serde::Deserialize;
use std::io::Read;

/// Defines the correspondence between business-model classes and relational
/// row classes.
///
/// Loaded once from a declarative document and immutable afterwards. The
/// document is JSON:
///
/// ```json
/// {
///   "class": [{
///     "modelClass": "Patient",
///     "domainClass": "PatientRow",
///     "property": [{ "modelName": "name", "domainName": "nameLink",
///                    "via": [{ "domainName": "name" }] }],
///     "collapseKey": [{ "propertyName": "gender", "keyName": "genderConceptKey" }]
///   }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelMap {
    #[serde(rename = "class", alias = "classes", default)]
    pub classes: Vec<ClassMap>,
}

impl ModelMap {
    pub fn new(classes: Vec<ClassMap>) -> ModelMap {
        ModelMap { classes }
    }

    /// Reads a mapping document.
    pub fn load(reader: impl Read) -> Result<ModelMap> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(json: &str) -> Result<ModelMap> {
        Ok(serde_json::from_str(json)?)
    }

    /// The class map for a business class. When a class is declared more
    /// than once, the first declaration wins.
    pub fn class_map(&self, model_class: &str) -> Option<&ClassMap> {
        self.classes
            .iter()
            .find(|class_map| class_map.model_class == model_class)
    }

    /// Checks every declaration against the catalog.
    pub fn verify(&self, catalog: &Catalog) -> Result<()> {
        super::verify::verify(self, catalog)
    }
}
