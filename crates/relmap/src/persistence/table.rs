use super::{Persistence, VERSION_KEY, VERSION_SEQUENCE};

use relmap_core::{
    driver::{Features, Row},
    schema::Class,
    stmt::{Expr, ExprLambda, ExprParam, Record, SqlStatement, Type, Value},
    DataContext, Error, Result,
};
use relmap_sql::VersionCheck;
use tracing::debug;
use uuid::Uuid;

impl Persistence {
    /// The object of `class` with key `key`.
    ///
    /// Looks in the context first, then in the data cache, then in the
    /// database.
    pub fn get(&self, cx: &mut DataContext, class: &str, key: Uuid) -> Result<Option<Record>> {
        if let Some(record) = cx.cached_object(class, key) {
            debug!(class, %key, "object cache hit");
            return Ok(Some(record.clone()));
        }

        if let Some(record) = self.data_cache.as_ref().and_then(|cache| cache.get(class, key)) {
            debug!(class, %key, "data cache hit");
            cx.cache_object(key, record.clone());
            return Ok(Some(record));
        }

        let class_map = self.mapper.expect_class_map(class)?;
        let stmt = self.builder().select_by_key(&class_map.domain_class, key)?;

        Ok(self.fetch(cx, class, stmt)?.into_iter().next())
    }

    /// Every object matching `predicate`, a lambda over a business class.
    pub fn query(&self, cx: &mut DataContext, predicate: &ExprLambda) -> Result<Vec<Record>> {
        let class = model_class(predicate)?;
        let stmt = self.select(predicate)?;
        self.fetch(cx, &class, stmt)
    }

    /// The number of objects matching `predicate`.
    pub fn count(&self, cx: &mut DataContext, predicate: &ExprLambda) -> Result<i64> {
        let stmt = self.provider.count(self.select(predicate)?);
        let value = self.scalar(cx, stmt, &Type::I64)?;

        value
            .as_i64()
            .ok_or_else(|| Error::type_conversion(value, "I64"))
    }

    /// Whether any object matches `predicate`.
    pub fn exists(&self, cx: &mut DataContext, predicate: &ExprLambda) -> Result<bool> {
        let stmt = self.provider.exists(self.select(predicate)?);
        let value = self.scalar(cx, stmt, &Type::Bool)?;

        value
            .as_bool()
            .ok_or_else(|| Error::type_conversion(value, "Bool"))
    }

    /// Inserts `record`, filling in its key and first version when it has
    /// none.
    pub fn insert(&self, cx: &mut DataContext, record: &mut Record) -> Result<()> {
        let class = self.mapper.catalog().expect_class(&record.class)?;
        let row_class = self.row_class(&record.class)?;

        let generated = self
            .provider
            .features()
            .contains(Features::AUTO_GENERATE_GUIDS | Features::RETURNED_INSERTS);

        if record.get(&class.key).is_null() && !generated {
            record.set(&class.key, Uuid::new_v4());
        }

        if class.has_property(VERSION_KEY) && record.get(VERSION_KEY).is_null() {
            record.set(VERSION_KEY, Uuid::new_v4());
        }

        if let Some(property) = class.property(VERSION_SEQUENCE) {
            if record.get(VERSION_SEQUENCE).is_null() {
                record.set(VERSION_SEQUENCE, Value::I64(1).cast(&property.ty)?);
            }
        }

        let mut row = self.mapper.to_row(record)?;
        let returning = row.get(&row_class.key).is_null();
        if returning {
            row.fields.shift_remove(&row_class.key);
        }

        let mut stmt = self.builder().insert(&row)?;
        if returning {
            stmt = self.provider.returning(stmt, &[&row_class.key]);
        }

        let _token = self.provider.lock(cx);
        let command = self.provider.create_command(cx, &stmt)?;

        if returning {
            let mut rows = cx.query(&command)?;
            let value = rows
                .first_mut()
                .and_then(|row| row.take(&row_class.key))
                .unwrap_or_default();
            let key = self.provider.convert_value(value, &Type::Uuid)?;

            if key.is_null() {
                return Err(Error::key_not_found(format!(
                    "insert into `{}` returned no key",
                    row_class.name
                )));
            }

            record.set(&class.key, key);
        } else {
            cx.execute(&command)?;
        }

        debug!(class = %record.class, key = ?record.get(&class.key), "inserted");
        self.remember(cx, &class.key, record);
        Ok(())
    }

    /// Writes the stored properties of `record` over its row.
    ///
    /// For versioned classes the row must still carry the version key
    /// `record` was read with; the update assigns a new version key and
    /// bumps the sequence. Losing that race fails with a condition-failed
    /// error and leaves `record` as it was.
    pub fn update(&self, cx: &mut DataContext, record: &mut Record) -> Result<()> {
        let class = self.mapper.catalog().expect_class(&record.class)?;

        let key = record.get_uuid(&class.key).ok_or_else(|| {
            Error::invalid_operation(format!("cannot update `{}` without a key", record.class))
        })?;

        let _token = self.provider.lock(cx);

        if !self.registry.is_versioned(&record.class) {
            let stmt = self.builder().update(&self.mapper.to_row(record)?, None)?;
            let command = self.provider.create_command(cx, &stmt)?;

            if cx.execute(&command)? == 0 {
                return Err(Error::key_not_found(format!(
                    "no `{}` with key {key}",
                    record.class
                )));
            }

            self.remember(cx, &class.key, record);
            return Ok(());
        }

        let check = VersionCheck {
            key_column: self.expect_column(class, VERSION_KEY)?,
            expected: record.get(VERSION_KEY).clone(),
            sequence_column: self.mapper.column(&class.name, VERSION_SEQUENCE),
        };

        let mut next = record.clone();
        next.set(VERSION_KEY, Uuid::new_v4());

        let stmt = self.builder().update(&self.mapper.to_row(&next)?, Some(&check))?;
        let command = self.provider.create_command(cx, &stmt)?;

        if cx.execute(&command)? == 0 {
            return Err(Error::condition_failed(format!(
                "`{}` {key} is no longer at version {:?}",
                record.class, check.expected
            )));
        }

        if let Some(property) = class.property(VERSION_SEQUENCE) {
            if let Some(sequence) = next.get_i64(VERSION_SEQUENCE) {
                next.set(VERSION_SEQUENCE, Value::I64(sequence + 1).cast(&property.ty)?);
            }
        }

        debug!(class = %record.class, %key, version = ?next.get(VERSION_KEY), "updated");
        *record = next;
        self.remember(cx, &class.key, record);
        Ok(())
    }

    /// Deletes the object of `class` with key `key`. Returns whether a row
    /// was removed.
    pub fn delete(&self, cx: &mut DataContext, class: &str, key: Uuid) -> Result<bool> {
        let class_map = self.mapper.expect_class_map(class)?;
        let stmt = self.builder().delete(&class_map.domain_class, key)?;

        let _token = self.provider.lock(cx);
        let command = self.provider.create_command(cx, &stmt)?;
        let deleted = cx.execute(&command)? > 0;

        cx.evict_object(class, key);
        if let Some(cache) = &self.data_cache {
            cache.remove(class, key);
        }

        Ok(deleted)
    }

    /// Objects of `class` whose stored property `property` equals `value`.
    pub(super) fn query_by_property(
        &self,
        cx: &mut DataContext,
        class: &str,
        property: &str,
        value: Value,
    ) -> Result<Vec<Record>> {
        let column = self.expect_column(self.mapper.catalog().expect_class(class)?, property)?;
        let row_class = self.row_class(class)?;

        let param = ExprParam::new("r", Type::class(&row_class.name));
        let access = self.mapper.catalog().member(&param, &column)?;
        let predicate = ExprLambda::unary(param, Expr::eq(access, value));

        let stmt = self.builder().select(&predicate)?;
        self.fetch(cx, class, stmt)
    }

    /// Runs a select over the row class of `class` and materializes each
    /// row as a business object, remembering every object read.
    pub(super) fn fetch(
        &self,
        cx: &mut DataContext,
        class: &str,
        stmt: SqlStatement,
    ) -> Result<Vec<Record>> {
        let key = &self.mapper.catalog().expect_class(class)?.key;
        let row_class = self.row_class(class)?;

        let command = self.provider.create_command(cx, &stmt)?;
        let rows = cx.query(&command)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let record = self.decode(class, row_class, row)?;
            self.remember(cx, key, &record);
            records.push(record);
        }

        Ok(records)
    }

    /// The relational class `class` is stored in.
    pub(super) fn row_class(&self, class: &str) -> Result<&Class> {
        let class_map = self.mapper.expect_class_map(class)?;
        self.mapper.catalog().expect_class(&class_map.domain_class)
    }

    pub(super) fn expect_column(&self, class: &Class, property: &str) -> Result<String> {
        self.mapper.column(&class.name, property).ok_or_else(|| {
            Error::invalid_mapping(format!(
                "`{}.{property}` is not stored in a column",
                class.name
            ))
        })
    }

    fn select(&self, predicate: &ExprLambda) -> Result<SqlStatement> {
        let mapped = self.mapper.map_model_expression(predicate)?;
        self.builder().select(&mapped)
    }

    fn scalar(&self, cx: &mut DataContext, stmt: SqlStatement, ty: &Type) -> Result<Value> {
        let command = self.provider.create_command(cx, &stmt)?;
        let value = cx
            .query(&command)?
            .into_iter()
            .next()
            .and_then(|row| row.values.into_iter().next())
            .unwrap_or_default();

        self.provider.convert_value(value, ty)
    }

    fn decode(&self, class: &str, row_class: &Class, mut row: Row) -> Result<Record> {
        let mut decoded = Record::new(&row_class.name);

        for property in row_class.scalar_properties() {
            let value = row.take(&property.name).unwrap_or_default();
            decoded.set(&property.name, self.provider.convert_value(value, &property.ty)?);
        }

        self.mapper.to_model(class, &decoded)
    }

    /// Puts `record` in the context and the data cache.
    fn remember(&self, cx: &mut DataContext, key_property: &str, record: &Record) {
        let Some(key) = record.get_uuid(key_property) else {
            return;
        };

        cx.cache_object(key, record.clone());

        if let Some(cache) = &self.data_cache {
            cache.add(key, record);
        }
    }
}

fn model_class(predicate: &ExprLambda) -> Result<String> {
    predicate
        .param()
        .and_then(|param| param.ty.as_class())
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_operation("a predicate takes one business class parameter"))
}
