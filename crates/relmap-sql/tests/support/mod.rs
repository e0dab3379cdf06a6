#![allow(dead_code)]

use relmap_core::{
    cache::StatementCache,
    driver::{
        Command, Connection, DataContext, Features, LockToken, Provider, ProviderConfig, Row,
        SqlKeyword,
    },
    schema::Class,
    stmt::{SqlStatement, Type, Value},
    Catalog, Result,
};
use relmap_sql::{command, Flavor};

/// A provider that only builds statements.
#[derive(Debug)]
pub struct Dialect {
    pub config: ProviderConfig,
    pub flavor: Flavor,
    pub statements: StatementCache,
}

impl Dialect {
    pub fn new(flavor: Flavor) -> Dialect {
        Dialect {
            config: ProviderConfig::single("test"),
            flavor,
            statements: StatementCache::new(16),
        }
    }

    pub fn context(&self) -> DataContext {
        DataContext::new(Box::new(NoConnection), "test", false)
    }
}

impl Provider for Dialect {
    fn features(&self) -> Features {
        Features::NONE
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn readonly_connection(&self) -> Result<DataContext> {
        Ok(self.context())
    }

    fn write_connection(&self) -> Result<DataContext> {
        Ok(self.context())
    }

    fn create_command(&self, cx: &mut DataContext, stmt: &SqlStatement) -> Result<Command> {
        command::create_command(self, cx, stmt, self.flavor, &self.statements)
    }

    fn create_raw_command(
        &self,
        cx: &mut DataContext,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Command> {
        command::create_raw_command(self, cx, sql, params, self.flavor, &self.statements)
    }

    fn create_stored_procedure_command(
        &self,
        _: &mut DataContext,
        name: &str,
        params: Vec<Value>,
    ) -> Result<Command> {
        Ok(Command::stored_procedure(name, params))
    }

    fn exists(&self, stmt: SqlStatement) -> SqlStatement {
        SqlStatement::new()
            .append_sql("SELECT EXISTS (")
            .append(stmt)
            .append_sql(")")
    }

    fn returning(&self, stmt: SqlStatement, _: &[&str]) -> SqlStatement {
        stmt
    }

    fn create_sql_keyword(&self, keyword: SqlKeyword) -> &'static str {
        match keyword {
            SqlKeyword::Lower => "LOWER",
            SqlKeyword::Upper => "UPPER",
            SqlKeyword::Like => "LIKE",
            SqlKeyword::ILike => "ILIKE",
        }
    }

    fn convert_value(&self, value: Value, ty: &Type) -> Result<Value> {
        value.cast(ty)
    }

    fn encode_value(&self, value: Value) -> Result<Value> {
        Ok(value)
    }

    fn lock(&self, _: &DataContext) -> LockToken {
        LockToken::none()
    }
}

pub struct NoConnection;

impl Connection for NoConnection {
    fn execute(&mut self, _: &Command) -> Result<u64> {
        Ok(0)
    }

    fn query(&mut self, _: &Command) -> Result<Vec<Row>> {
        Ok(vec![])
    }

    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Row classes for a patient with names reached through a link table.
pub fn catalog() -> Catalog {
    Catalog::new()
        .with_class(
            Class::new("PatientRow")
                .table("patient")
                .field("key", Type::Uuid)
                .field("gender_concept_key", Type::nullable(Type::Uuid))
                .field("name_link_key", Type::nullable(Type::Uuid))
                .field("age", Type::nullable(Type::I32))
                .belongs_to("gender", "ConceptRow", "gender_concept_key")
                .belongs_to("name_link", "PatientNameRow", "name_link_key")
                .has_many("names", "PatientNameRow", "patient_key"),
        )
        .with_class(
            Class::new("PatientNameRow")
                .table("patient_name")
                .field("key", Type::Uuid)
                .field("patient_key", Type::Uuid)
                .field("name_key", Type::Uuid)
                .belongs_to("name", "NameRow", "name_key"),
        )
        .with_class(
            Class::new("NameRow")
                .table("name")
                .field("key", Type::Uuid)
                .field("family_column", Type::nullable(Type::String)),
        )
        .with_class(
            Class::new("ConceptRow")
                .table("concept")
                .field("key", Type::Uuid)
                .field("mnemonic", Type::String),
        )
}
