use crate::{
    stmt::{Expr, Type},
    Error, Result,
};

use indexmap::IndexMap;
use serde::Deserialize;

/// Registry of the classes on both sides of the mapping.
///
/// Business-model classes and relational row classes live side by side; a
/// row class is one that names a table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "CatalogDocument")]
pub struct Catalog {
    classes: IndexMap<String, Class>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub name: String,

    /// Backing table, for relational row classes.
    #[serde(default)]
    pub table: Option<String>,

    /// Name of the primary key property.
    #[serde(default = "default_key")]
    pub key: String,

    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub ty: Type,

    #[serde(default)]
    pub relation: Option<Relation>,
}

/// How a navigation property reaches its target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    /// Scalar navigation through the foreign key property `key` declared on
    /// the same class.
    BelongsTo { key: String },

    /// Collection navigation; `foreign_key` is the property of the element
    /// class that refers back to the owner.
    #[serde(rename_all = "camelCase")]
    HasMany { foreign_key: String },
}

#[derive(Deserialize)]
struct CatalogDocument {
    classes: Vec<Class>,
}

fn default_key() -> String {
    "key".to_string()
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog::default()
    }

    pub fn from_json(json: &str) -> Result<Catalog> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_class(mut self, class: Class) -> Catalog {
        self.add(class);
        self
    }

    pub fn add(&mut self, class: Class) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    /// Like [`Catalog::class`], failing with an invalid-operation error when
    /// the class is unknown.
    pub fn expect_class(&self, name: &str) -> Result<&Class> {
        self.class(name)
            .ok_or_else(|| Error::invalid_operation(format!("unknown class `{name}`")))
    }

    pub fn property(&self, class: &str, name: &str) -> Option<&Property> {
        self.class(class)?.property(name)
    }

    /// Builds a typed access of property `name` on `receiver`.
    ///
    /// The receiver must be class typed; a nullable receiver makes the
    /// result nullable.
    pub fn member(&self, receiver: impl Into<Expr>, name: &str) -> Result<Expr> {
        let receiver = receiver.into();
        let receiver_ty = receiver.ty();

        let Some(class) = receiver_ty.as_class() else {
            return Err(Error::invalid_operation(format!(
                "member `{name}` accessed on non-class type {receiver_ty:?}"
            )));
        };

        let property = self
            .property(class, name)
            .ok_or_else(|| Error::missing_member(class, name))?;

        let ty = if receiver_ty.is_nullable() {
            Type::nullable(property.ty.clone())
        } else {
            property.ty.clone()
        };

        Ok(Expr::member(receiver, name, ty))
    }
}

impl From<CatalogDocument> for Catalog {
    fn from(document: CatalogDocument) -> Catalog {
        let mut catalog = Catalog::new();
        for class in document.classes {
            catalog.add(class);
        }
        catalog
    }
}

impl Class {
    pub fn new(name: impl Into<String>) -> Class {
        Class {
            name: name.into(),
            table: None,
            key: default_key(),
            properties: vec![],
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Class {
        self.table = Some(table.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Class {
        self.key = key.into();
        self
    }

    /// Adds a scalar property.
    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Class {
        self.properties.push(Property::new(name, ty));
        self
    }

    /// Adds a scalar navigation through the foreign key property `key`.
    pub fn belongs_to(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        key: impl Into<String>,
    ) -> Class {
        self.properties.push(Property {
            name: name.into(),
            ty: Type::nullable(Type::class(target)),
            relation: Some(Relation::BelongsTo { key: key.into() }),
        });
        self
    }

    /// Adds a collection navigation over `target` rows whose `foreign_key`
    /// refers back to this class.
    pub fn has_many(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Class {
        self.properties.push(Property {
            name: name.into(),
            ty: Type::list(Type::class(target)),
            relation: Some(Relation::HasMany {
                foreign_key: foreign_key.into(),
            }),
        });
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Properties stored in the class's own row.
    pub fn scalar_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties
            .iter()
            .filter(|property| property.relation.is_none() && property.ty.is_scalar())
    }

    pub fn navigations(&self) -> impl Iterator<Item = &Property> {
        self.properties
            .iter()
            .filter(|property| property.relation.is_some())
    }

    pub fn is_row(&self) -> bool {
        self.table.is_some()
    }
}

impl Property {
    pub fn new(name: impl Into<String>, ty: Type) -> Property {
        Property {
            name: name.into(),
            ty,
            relation: None,
        }
    }

    pub fn is_navigation(&self) -> bool {
        self.relation.is_some()
    }

    /// The class a navigation property leads to.
    pub fn target(&self) -> Option<&str> {
        match &self.relation {
            Some(Relation::BelongsTo { .. }) => self.ty.as_class(),
            Some(Relation::HasMany { .. }) => self.ty.item().and_then(Type::as_class),
            None => None,
        }
    }
}
