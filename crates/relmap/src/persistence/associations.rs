use super::{
    Persistence, EFFECTIVE_VERSION_SEQUENCE, OBSOLETE_VERSION_SEQUENCE, OBSOLETION_TIME,
    VERSION_SEQUENCE,
};

use relmap_core::{
    schema::{Class, Property, Relation},
    stmt::{Expr, ExprLambda, ExprParam, LoadState, Record, Type, Value},
    DataContext, Error, Result,
};
use tracing::{debug, trace};
use uuid::Uuid;

impl Persistence {
    /// Loads the navigations of `record` up to `state`.
    ///
    /// `PartialLoad` only loads wire-visible navigations. Navigations the
    /// registry gates on classifier values load only for matching objects.
    /// Objects already being loaded further up the graph are left as they
    /// are, which is what ends the recursion on cyclic graphs.
    pub fn load_associations(
        &self,
        cx: &mut DataContext,
        record: &mut Record,
        state: LoadState,
    ) -> Result<()> {
        if record.load_state.satisfies(state) {
            return Ok(());
        }

        let class = self.mapper.catalog().expect_class(&record.class)?;
        let Some(key) = record.get_uuid(&class.key) else {
            return Ok(());
        };

        if !cx.begin_loading(&record.class, key) {
            trace!(class = %record.class, %key, "already loading");
            return Ok(());
        }

        let loaded = self.load_navigations(cx, class, key, record, state);
        cx.end_loading(&record.class, key);
        loaded?;

        record.load_state = state;
        cx.cache_object(key, record.clone());
        Ok(())
    }

    fn load_navigations(
        &self,
        cx: &mut DataContext,
        class: &Class,
        key: Uuid,
        record: &mut Record,
        state: LoadState,
    ) -> Result<()> {
        let classifier = match self.registry.classifier(&class.name) {
            Some(classifier) => {
                let property = classifier.redirect.as_deref().unwrap_or(&classifier.property);
                record.get(property).clone()
            }
            None => Value::Null,
        };

        for navigation in self.registry.navigations(class) {
            if navigation.ignore
                || (state == LoadState::PartialLoad && !navigation.wire_visible)
                || !navigation.loads_for(&classifier)
            {
                continue;
            }

            let Some(property) = class.property(&navigation.property) else {
                continue;
            };

            let value = match &property.relation {
                Some(Relation::BelongsTo { key: foreign_key }) => {
                    match self.load_reference(cx, property, record.get_uuid(foreign_key), state)? {
                        Some(target) => Value::Record(target),
                        None => continue,
                    }
                }
                Some(Relation::HasMany { foreign_key }) => Value::List(
                    self.load_collection(cx, property, foreign_key, key, record, state)?
                        .into_iter()
                        .map(Value::Record)
                        .collect(),
                ),
                None => continue,
            };

            debug!(class = %class.name, %key, navigation = %property.name, "loaded");
            record.set(&property.name, value);
        }

        Ok(())
    }

    fn load_reference(
        &self,
        cx: &mut DataContext,
        property: &Property,
        key: Option<Uuid>,
        state: LoadState,
    ) -> Result<Option<Record>> {
        let (Some(key), Some(target)) = (key, property.target()) else {
            return Ok(None);
        };

        let Some(mut record) = self.get(cx, target, key)? else {
            return Ok(None);
        };

        self.load_associations(cx, &mut record, state)?;
        Ok(Some(record))
    }

    /// The elements of a collection navigation. Elements carrying version
    /// ranges are restricted to the parent's current version, or for an
    /// obsoleted parent to the version it ended at.
    fn load_collection(
        &self,
        cx: &mut DataContext,
        property: &Property,
        foreign_key: &str,
        key: Uuid,
        parent: &Record,
        state: LoadState,
    ) -> Result<Vec<Record>> {
        let target = property.target().ok_or_else(|| {
            Error::invalid_mapping(format!("`{}` is not a collection of objects", property.name))
        })?;

        let element = self.mapper.catalog().expect_class(target)?;
        let row_class = self.row_class(target)?;
        let catalog = self.mapper.catalog();

        let param = ExprParam::new("e", Type::class(&row_class.name));
        let column = |property: &str| -> Result<Expr> {
            catalog.member(&param, &self.expect_column(element, property)?)
        };

        let mut condition = Expr::eq(column(foreign_key)?, Value::Uuid(key));

        let versioned = element.has_property(EFFECTIVE_VERSION_SEQUENCE)
            && element.has_property(OBSOLETE_VERSION_SEQUENCE);

        if versioned {
            let obsolete = column(OBSOLETE_VERSION_SEQUENCE)?;
            let sequence = parent.get(VERSION_SEQUENCE);

            condition = if !parent.get(OBSOLETION_TIME).is_null() && !sequence.is_null() {
                Expr::and(
                    condition,
                    Expr::and(
                        Expr::le(column(EFFECTIVE_VERSION_SEQUENCE)?, sequence.clone()),
                        Expr::or(
                            Expr::eq(obsolete.clone(), Expr::null()),
                            Expr::gt(obsolete, sequence.clone()),
                        ),
                    ),
                )
            } else {
                Expr::and(condition, Expr::eq(obsolete, Expr::null()))
            };
        }

        let predicate = ExprLambda::unary(param, condition);
        let stmt = self.builder().select(&predicate)?;

        let mut elements = self.fetch(cx, target, stmt)?;
        for element in &mut elements {
            self.load_associations(cx, element, state)?;
        }

        Ok(elements)
    }
}
