use super::{Persistence, OBSOLETION_TIME, VERSION_KEY, VERSION_SEQUENCE};
use crate::registry::Classifier;

use relmap_core::{
    schema::{Class, Relation},
    stmt::{Record, Value},
    DataContext, Error, Result,
};
use tracing::debug;

impl Persistence {
    /// The stored object `record` refers to, if any.
    ///
    /// With a key, the object is looked up by key. Without one, the class's
    /// classifier value is looked up, going through the classifier cache.
    pub fn try_get_existing(
        &self,
        cx: &mut DataContext,
        record: &Record,
    ) -> Result<Option<Record>> {
        let class = self.mapper.catalog().expect_class(&record.class)?;

        if let Some(key) = record.get_uuid(&class.key) {
            return self.get(cx, &record.class, key);
        }

        let Some(classifier) = self.registry.classifier(&record.class) else {
            return Ok(None);
        };

        let value = self.classifier_value(cx, record, classifier)?;
        if value.is_null() {
            return Ok(None);
        }

        let cache_key = (record.class.clone(), value.clone());

        if let Some(key) = self.classifiers.get(&cache_key) {
            debug!(class = %record.class, classifier = ?value, %key, "classifier cache hit");

            if let Some(existing) = self.get(cx, &record.class, key)? {
                return Ok(Some(existing));
            }

            // The row is gone
            self.classifiers.remove(&cache_key);
        }

        debug!(class = %record.class, classifier = ?value, "classifier cache miss");

        let property = classifier.redirect.as_deref().unwrap_or(&classifier.property);
        let existing = self
            .query_by_property(cx, &record.class, property, value)?
            .into_iter()
            .next();

        if let Some(key) = existing.as_ref().and_then(|existing| existing.get_uuid(&class.key)) {
            self.classifiers.insert(cache_key, key);
        }

        Ok(existing)
    }

    /// Makes sure `record` is stored, writing only what changed.
    ///
    /// Referenced objects are resolved first. Unless child inserts are
    /// enabled, a reference to an object that is not stored fails with a
    /// key-not-found error before anything is written. Then:
    ///
    /// * a stored object with the same property values is left alone;
    /// * a stored object with different values is updated;
    /// * otherwise `record` is inserted.
    ///
    /// In every case the stored key and version are copied onto `record`.
    pub fn ensure_exists(&self, cx: &mut DataContext, record: &mut Record) -> Result<()> {
        let class = self.mapper.catalog().expect_class(&record.class)?;

        self.ensure_references(cx, class, record)?;

        let Some(existing) = self.try_get_existing(cx, record)? else {
            return self.insert(cx, record);
        };

        record.set(&class.key, existing.get(&class.key).clone());

        if unchanged(class, record, &existing) {
            copy_version(&existing, record);
            debug!(class = %record.class, key = ?record.get(&class.key), "already up to date");
            return Ok(());
        }

        copy_version(&existing, record);
        self.update(cx, record)
    }

    /// Resolves every loaded scalar reference of `record` to a stored
    /// object and points the foreign key at it.
    fn ensure_references(&self, cx: &mut DataContext, class: &Class, record: &mut Record) -> Result<()> {
        for navigation in class.navigations() {
            let Some(Relation::BelongsTo { key: foreign_key }) = &navigation.relation else {
                continue;
            };

            let Some(Value::Record(child)) = record.fields.get(&navigation.name) else {
                continue;
            };

            let mut child = child.clone();

            if self.auto_insert_children {
                self.ensure_exists(cx, &mut child)?;
            } else {
                let Some(existing) = self.try_get_existing(cx, &child)? else {
                    return Err(Error::key_not_found(format!(
                        "`{}.{}` refers to a `{}` that is not stored",
                        record.class, navigation.name, child.class
                    )));
                };

                let child_key = &self.mapper.catalog().expect_class(&child.class)?.key;
                child.set(child_key, existing.get(child_key).clone());
                copy_version(&existing, &mut child);
            }

            let child_key = &self.mapper.catalog().expect_class(&child.class)?.key;
            record.set(foreign_key, child.get(child_key).clone());
            record.set(&navigation.name, child);
        }

        Ok(())
    }

    /// The value `record` is classified by. A redirected classifier yields
    /// the key of the object it refers to.
    fn classifier_value(
        &self,
        cx: &mut DataContext,
        record: &Record,
        classifier: &Classifier,
    ) -> Result<Value> {
        let Some(redirect) = &classifier.redirect else {
            return Ok(record.get(&classifier.property).clone());
        };

        let key = record.get(redirect);
        if !key.is_null() {
            return Ok(key.clone());
        }

        let Value::Record(target) = record.get(&classifier.property) else {
            return Ok(Value::Null);
        };

        let target_key = &self.mapper.catalog().expect_class(&target.class)?.key;

        Ok(match self.try_get_existing(cx, target)? {
            Some(existing) => existing.get(target_key).clone(),
            None => Value::Null,
        })
    }
}

/// Whether every stored property `record` carries matches `existing`.
/// Version bookkeeping is not compared.
fn unchanged(class: &Class, record: &Record, existing: &Record) -> bool {
    class
        .scalar_properties()
        .filter(|property| {
            ![VERSION_KEY, VERSION_SEQUENCE, OBSOLETION_TIME].contains(&property.name.as_str())
        })
        .filter_map(|property| Some((record.fields.get(&property.name)?, existing.get(&property.name))))
        .all(|(ours, theirs)| ours.is_equal(theirs))
}

fn copy_version(from: &Record, to: &mut Record) {
    for property in [VERSION_KEY, VERSION_SEQUENCE] {
        if let Some(value) = from.fields.get(property) {
            to.set(property, value.clone());
        }
    }
}
