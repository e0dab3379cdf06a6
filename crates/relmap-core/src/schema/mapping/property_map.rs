use serde::Deserialize;

/// Maps a business property onto a relational property.
///
/// With a non-empty `via`, `domain_name` names the first hop and each `via`
/// entry names the next hop on the class reached so far.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMap {
    #[serde(default)]
    pub model_name: String,

    pub domain_name: String,

    #[serde(default)]
    pub via: Vec<PropertyMap>,
}

impl PropertyMap {
    pub fn new(model_name: impl Into<String>, domain_name: impl Into<String>) -> PropertyMap {
        PropertyMap {
            model_name: model_name.into(),
            domain_name: domain_name.into(),
            via: vec![],
        }
    }

    /// Appends a hop to the `via` chain.
    pub fn via(mut self, domain_name: impl Into<String>) -> PropertyMap {
        self.via.push(PropertyMap::new("", domain_name));
        self
    }

    /// Every relational property name along the chain, first hop first.
    pub fn hops(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.domain_name.as_str())
            .chain(self.via.iter().map(|hop| hop.domain_name.as_str()))
    }
}
