use super::{CollapseKey, PropertyMap};

use serde::Deserialize;

/// Maps one business class onto one relational row class.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMap {
    pub model_class: String,
    pub domain_class: String,

    #[serde(rename = "property", alias = "properties", default)]
    pub properties: Vec<PropertyMap>,

    #[serde(rename = "collapseKey", alias = "collapseKeys", default)]
    pub collapse_keys: Vec<CollapseKey>,
}

impl ClassMap {
    pub fn new(model_class: impl Into<String>, domain_class: impl Into<String>) -> ClassMap {
        ClassMap {
            model_class: model_class.into(),
            domain_class: domain_class.into(),
            properties: vec![],
            collapse_keys: vec![],
        }
    }

    pub fn property(mut self, property: PropertyMap) -> ClassMap {
        self.properties.push(property);
        self
    }

    pub fn collapse_key(mut self, collapse_key: CollapseKey) -> ClassMap {
        self.collapse_keys.push(collapse_key);
        self
    }

    /// The first property map declared for `model_name`.
    pub fn property_map(&self, model_name: &str) -> Option<&PropertyMap> {
        self.properties
            .iter()
            .find(|property| property.model_name == model_name)
    }

    /// The property map whose terminal column is `domain_name`, if the
    /// column is reached directly.
    pub fn property_map_for_column(&self, domain_name: &str) -> Option<&PropertyMap> {
        self.properties
            .iter()
            .find(|property| property.via.is_empty() && property.domain_name == domain_name)
    }

    pub fn collapse_key_for(&self, property_name: &str) -> Option<&CollapseKey> {
        self.collapse_keys
            .iter()
            .find(|key| key.property_name == property_name)
    }
}
