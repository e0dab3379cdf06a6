use relmap_core::{schema::Class, stmt::Value};

use indexmap::IndexMap;

/// Per business class persistence metadata, registered once at startup.
///
/// Classes without an entry use the defaults: no classifier, and every
/// navigation of the class loaded eagerly and visible on the wire.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entities: IndexMap<String, EntityDef>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EntityDef {
    pub classifier: Option<Classifier>,

    /// Updates go through the version chain
    pub versioned: bool,

    /// Navigations with non-default loading rules
    pub navigations: Vec<Navigation>,
}

/// The unique business property identifying a row when its key is not
/// known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    pub property: String,

    /// When the classifier is a reference, the property holding the
    /// referenced object's key
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub property: String,
    pub ignore: bool,
    pub wire_visible: bool,
    pub auto_load: AutoLoad,
}

/// When a navigation is loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum AutoLoad {
    Always,
    Never,

    /// Only for objects whose classifier has one of these values.
    ForClassifiers(Vec<Value>),
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn entity(mut self, class: impl Into<String>, def: EntityDef) -> Registry {
        self.register(class, def);
        self
    }

    pub fn register(&mut self, class: impl Into<String>, def: EntityDef) {
        self.entities.insert(class.into(), def);
    }

    pub fn get(&self, class: &str) -> Option<&EntityDef> {
        self.entities.get(class)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&str, &EntityDef)> {
        self.entities.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn classifier(&self, class: &str) -> Option<&Classifier> {
        self.get(class)?.classifier.as_ref()
    }

    pub fn is_versioned(&self, class: &str) -> bool {
        self.get(class).is_some_and(|def| def.versioned)
    }

    /// The loading rules of every navigation of `class`. Navigations the
    /// registry does not mention get the defaults.
    pub fn navigations(&self, class: &Class) -> Vec<Navigation> {
        let registered = self
            .get(&class.name)
            .map(|def| &def.navigations[..])
            .unwrap_or_default();

        class
            .navigations()
            .map(|property| {
                registered
                    .iter()
                    .find(|navigation| navigation.property == property.name)
                    .cloned()
                    .unwrap_or_else(|| Navigation::new(&property.name))
            })
            .collect()
    }
}

impl EntityDef {
    pub fn new() -> EntityDef {
        EntityDef::default()
    }

    pub fn classifier(mut self, classifier: Classifier) -> EntityDef {
        self.classifier = Some(classifier);
        self
    }

    pub fn versioned(mut self) -> EntityDef {
        self.versioned = true;
        self
    }

    pub fn navigation(mut self, navigation: Navigation) -> EntityDef {
        self.navigations.push(navigation);
        self
    }
}

impl Classifier {
    pub fn new(property: impl Into<String>) -> Classifier {
        Classifier {
            property: property.into(),
            redirect: None,
        }
    }

    /// A classifier that is a reference whose key is held in `key`.
    pub fn redirect(property: impl Into<String>, key: impl Into<String>) -> Classifier {
        Classifier {
            property: property.into(),
            redirect: Some(key.into()),
        }
    }
}

impl Navigation {
    pub fn new(property: impl Into<String>) -> Navigation {
        Navigation {
            property: property.into(),
            ignore: false,
            wire_visible: true,
            auto_load: AutoLoad::Always,
        }
    }

    pub fn ignore(mut self) -> Navigation {
        self.ignore = true;
        self
    }

    /// Leaves the navigation out of partial loads.
    pub fn hidden(mut self) -> Navigation {
        self.wire_visible = false;
        self
    }

    pub fn auto_load(mut self, auto_load: AutoLoad) -> Navigation {
        self.auto_load = auto_load;
        self
    }

    /// Whether the navigation is loaded for an object with classifier value
    /// `classifier`.
    pub fn loads_for(&self, classifier: &Value) -> bool {
        match &self.auto_load {
            AutoLoad::Always => true,
            AutoLoad::Never => false,
            AutoLoad::ForClassifiers(values) => values.iter().any(|value| value.is_equal(classifier)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_core::stmt::Type;

    fn act() -> Class {
        Class::new("Act")
            .field("key", Type::Uuid)
            .belongs_to("mood", "Concept", "mood_key")
            .has_many("participations", "Participation", "act_key")
            .has_many("notes", "Note", "act_key")
    }

    #[test]
    fn unregistered_navigations_get_defaults() {
        let registry = Registry::new();
        let navigations = registry.navigations(&act());

        assert_eq!(navigations.len(), 3);
        assert!(navigations
            .iter()
            .all(|navigation| navigation.auto_load == AutoLoad::Always && navigation.wire_visible));
    }

    #[test]
    fn registered_rules_override_defaults() {
        let registry = Registry::new().entity(
            "Act",
            EntityDef::new()
                .classifier(Classifier::redirect("class_concept", "class_concept_key"))
                .navigation(Navigation::new("notes").hidden())
                .navigation(
                    Navigation::new("participations")
                        .auto_load(AutoLoad::ForClassifiers(vec!["OBS".into()])),
                ),
        );

        let navigations = registry.navigations(&act());
        assert!(!navigations[2].wire_visible);
        assert!(navigations[1].loads_for(&"OBS".into()));
        assert!(!navigations[1].loads_for(&"PROC".into()));
        assert_eq!(
            registry.classifier("Act").and_then(|c| c.redirect.as_deref()),
            Some("class_concept_key")
        );
    }
}
