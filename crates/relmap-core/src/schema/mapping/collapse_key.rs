use serde::Deserialize;

/// Rewrites `.key` on the navigation property `property_name` to the
/// foreign-key column `key_name` of the row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapseKey {
    pub property_name: String,
    pub key_name: String,
}

impl CollapseKey {
    pub fn new(property_name: impl Into<String>, key_name: impl Into<String>) -> CollapseKey {
        CollapseKey {
            property_name: property_name.into(),
            key_name: key_name.into(),
        }
    }
}
