#![allow(dead_code)]

use relmap::{
    registry::{Classifier, EntityDef, Navigation},
    stmt::{Type, Value},
    Catalog, ClassMap, CollapseKey, DataContext, ModelMap, ModelMapper, Persistence, PropertyMap,
    Provider, Registry, Sqlite,
};
use relmap_core::schema::Class;
use std::sync::Arc;
use tempfile::TempDir;

/// Business classes on top, the relational rows they are stored in below.
pub fn catalog() -> Catalog {
    Catalog::new()
        .with_class(
            Class::new("Concept")
                .field("key", Type::Uuid)
                .field("mnemonic", Type::String)
                .field("parent_key", Type::nullable(Type::Uuid))
                .belongs_to("parent", "Concept", "parent_key"),
        )
        .with_class(
            Class::new("PersonName")
                .field("key", Type::Uuid)
                .field("family", Type::String)
                .field("given", Type::nullable(Type::String)),
        )
        .with_class(
            Class::new("Patient")
                .field("key", Type::Uuid)
                .field("version_key", Type::nullable(Type::Uuid))
                .field("version_sequence", Type::nullable(Type::I64))
                .field("obsoletion_time", Type::nullable(Type::Timestamp))
                .field("gender_key", Type::nullable(Type::Uuid))
                .belongs_to("gender", "Concept", "gender_key")
                .field("name_key", Type::nullable(Type::Uuid))
                .belongs_to("name", "PersonName", "name_key")
                .has_many("identifiers", "Identifier", "patient_key")
                .has_many("addresses", "Address", "patient_key"),
        )
        .with_class(
            Class::new("Identifier")
                .field("key", Type::Uuid)
                .field("value", Type::String)
                .field("patient_key", Type::nullable(Type::Uuid)),
        )
        .with_class(
            Class::new("Address")
                .field("key", Type::Uuid)
                .field("patient_key", Type::nullable(Type::Uuid))
                .belongs_to("patient", "Patient", "patient_key")
                .field("city", Type::String)
                .field("effective_version_sequence", Type::nullable(Type::I64))
                .field("obsolete_version_sequence", Type::nullable(Type::I64)),
        )
        .with_class(
            Class::new("ConceptRow")
                .table("concept")
                .field("key", Type::Uuid)
                .field("mnemonic", Type::String)
                .field("parent_key", Type::nullable(Type::Uuid)),
        )
        .with_class(
            Class::new("NameRow")
                .table("entity_name")
                .field("key", Type::Uuid)
                .field("family_name", Type::String)
                .field("given_name", Type::nullable(Type::String)),
        )
        .with_class(
            Class::new("EntityRow")
                .table("entity")
                .field("key", Type::Uuid)
                .field("name_key", Type::nullable(Type::Uuid))
                .belongs_to("name", "NameRow", "name_key"),
        )
        .with_class(
            Class::new("PatientRow")
                .table("patient")
                .field("key", Type::Uuid)
                .field("version_key", Type::nullable(Type::Uuid))
                .field("version_sequence", Type::nullable(Type::I64))
                .field("obsoletion_time", Type::nullable(Type::Timestamp))
                .field("gender_concept_key", Type::nullable(Type::Uuid))
                .belongs_to("gender", "ConceptRow", "gender_concept_key")
                .field("entity_key", Type::nullable(Type::Uuid))
                .belongs_to("entity", "EntityRow", "entity_key")
                .has_many("identifier_links", "IdentifierLinkRow", "patient_key")
                .has_many("addresses", "AddressRow", "patient_key"),
        )
        .with_class(
            Class::new("IdentifierRow")
                .table("identifier")
                .field("key", Type::Uuid)
                .field("value", Type::String),
        )
        .with_class(
            Class::new("IdentifierLinkRow")
                .table("patient_identifier")
                .field("key", Type::Uuid)
                .field("patient_key", Type::Uuid)
                .field("identifier_key", Type::Uuid)
                .belongs_to("identifier", "IdentifierRow", "identifier_key"),
        )
        .with_class(
            Class::new("AddressRow")
                .table("patient_address")
                .field("key", Type::Uuid)
                .field("patient_key", Type::nullable(Type::Uuid))
                .field("city", Type::String)
                .field("effective_version_sequence", Type::nullable(Type::I64))
                .field("obsolete_version_sequence", Type::nullable(Type::I64)),
        )
}

pub fn model_map() -> ModelMap {
    ModelMap::new(vec![
        ClassMap::new("Concept", "ConceptRow"),
        ClassMap::new("PersonName", "NameRow")
            .property(PropertyMap::new("family", "family_name"))
            .property(PropertyMap::new("given", "given_name")),
        ClassMap::new("Patient", "PatientRow")
            .property(PropertyMap::new("name", "entity").via("name"))
            .property(PropertyMap::new("identifiers", "identifier_links").via("identifier"))
            .collapse_key(CollapseKey::new("gender", "gender_concept_key")),
        ClassMap::new("Identifier", "IdentifierRow"),
        ClassMap::new("Address", "AddressRow"),
    ])
}

pub fn mapper() -> ModelMapper {
    ModelMapper::new(catalog(), model_map()).unwrap()
}

pub fn registry() -> Registry {
    Registry::new()
        .entity(
            "Patient",
            EntityDef::new()
                .versioned()
                .navigation(Navigation::new("identifiers").ignore())
                .navigation(Navigation::new("addresses").hidden()),
        )
        .entity(
            "Concept",
            EntityDef::new().classifier(Classifier::new("mnemonic")),
        )
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE concept (key BLOB PRIMARY KEY, mnemonic TEXT NOT NULL, parent_key BLOB)",
    "CREATE TABLE entity_name (key BLOB PRIMARY KEY, family_name TEXT NOT NULL, given_name TEXT)",
    "CREATE TABLE entity (key BLOB PRIMARY KEY, name_key BLOB)",
    "CREATE TABLE patient (key BLOB PRIMARY KEY, version_key BLOB, version_sequence INTEGER, \
     obsoletion_time INTEGER, gender_concept_key BLOB, entity_key BLOB)",
    "CREATE TABLE identifier (key BLOB PRIMARY KEY, value TEXT NOT NULL)",
    "CREATE TABLE patient_identifier (key BLOB PRIMARY KEY, patient_key BLOB NOT NULL, \
     identifier_key BLOB NOT NULL)",
    "CREATE TABLE patient_address (key BLOB PRIMARY KEY, patient_key BLOB, city TEXT NOT NULL, \
     effective_version_sequence INTEGER, obsolete_version_sequence INTEGER)",
];

/// A SQLite database file with the fixture schema.
pub struct Fixture {
    _dir: TempDir,
    pub url: String,
    pub persistence: Persistence,
}

impl Fixture {
    pub fn new() -> Fixture {
        Fixture::with(registry(), false)
    }

    pub fn with(registry: Registry, auto_insert_children: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("relmap.db").display());
        let provider = Sqlite::open(url.clone()).unwrap();

        let mut cx = provider.write_connection().unwrap();
        for sql in SCHEMA {
            let command = provider.create_raw_command(&mut cx, sql, vec![]).unwrap();
            cx.execute(&command).unwrap();
        }

        let persistence = Persistence::new(Arc::new(provider), Arc::new(mapper()))
            .registry(Arc::new(registry))
            .auto_insert_children(auto_insert_children);

        Fixture {
            _dir: dir,
            url,
            persistence,
        }
    }

    pub fn cx(&self) -> DataContext {
        self.persistence.write_context().unwrap()
    }

    pub fn execute(&self, cx: &mut DataContext, sql: &str, params: Vec<Value>) -> u64 {
        let provider = self.persistence.provider();
        let command = provider.create_raw_command(cx, sql, params).unwrap();
        cx.execute(&command).unwrap()
    }

    /// Number of rows in `table`, read on a fresh connection.
    pub fn rows(&self, table: &str) -> i64 {
        let mut cx = self.persistence.readonly_context().unwrap();
        let provider = self.persistence.provider();
        let command = provider
            .create_raw_command(&mut cx, &format!("SELECT COUNT(*) FROM {table}"), vec![])
            .unwrap();

        let rows = cx.query(&command).unwrap();
        rows[0].values[0].as_i64().unwrap()
    }
}
