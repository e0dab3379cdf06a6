use super::{Catalog, ClassMap, ModelMap, PropertyMap};
use crate::{stmt::Type, Error, Result};

use std::collections::HashSet;

struct Verify<'a> {
    map: &'a ModelMap,
    catalog: &'a Catalog,
}

pub(super) fn verify(map: &ModelMap, catalog: &Catalog) -> Result<()> {
    Verify { map, catalog }.verify()
}

impl Verify<'_> {
    fn verify(&self) -> Result<()> {
        self.verify_each_class_mapped_once()?;

        for class_map in &self.map.classes {
            self.verify_classes_exist(class_map)?;

            for property in &class_map.properties {
                self.verify_property(class_map, property)?;
            }

            self.verify_collapse_keys(class_map)?;
        }

        Ok(())
    }

    fn verify_each_class_mapped_once(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for class_map in &self.map.classes {
            if !seen.insert(&class_map.model_class) {
                return Err(Error::invalid_mapping(format!(
                    "class `{}` is mapped more than once",
                    class_map.model_class
                )));
            }
        }

        Ok(())
    }

    fn verify_classes_exist(&self, class_map: &ClassMap) -> Result<()> {
        self.catalog.expect_class(&class_map.model_class)?;
        self.catalog.expect_class(&class_map.domain_class)?;
        Ok(())
    }

    fn verify_property(&self, class_map: &ClassMap, property: &PropertyMap) -> Result<()> {
        // Only `via` hops may leave the business name out
        if property.model_name.is_empty() {
            return Err(Error::invalid_mapping(format!(
                "property map of `{}` onto `{}` names no business property",
                class_map.model_class, property.domain_name
            )));
        }

        if self
            .catalog
            .property(&class_map.model_class, &property.model_name)
            .is_none()
        {
            return Err(Error::missing_member(
                &class_map.model_class,
                &property.model_name,
            ));
        }

        let mut class = class_map.domain_class.clone();

        for hop in property.hops() {
            let next = self
                .catalog
                .property(&class, hop)
                .ok_or_else(|| Error::missing_member(&class, hop))?;

            let ty = next.ty.item().unwrap_or(&next.ty);
            match ty.as_class() {
                Some(target) => class = target.to_string(),
                // Only the terminal hop may be a column
                None => class = String::new(),
            }
        }

        Ok(())
    }

    fn verify_collapse_keys(&self, class_map: &ClassMap) -> Result<()> {
        for collapse_key in &class_map.collapse_keys {
            if self
                .catalog
                .property(&class_map.model_class, &collapse_key.property_name)
                .is_none()
            {
                return Err(Error::missing_member(
                    &class_map.model_class,
                    &collapse_key.property_name,
                ));
            }

            let column = self
                .catalog
                .property(&class_map.domain_class, &collapse_key.key_name)
                .ok_or_else(|| Error::missing_member(&class_map.domain_class, &collapse_key.key_name))?;

            if !matches!(column.ty.non_nullable(), Type::Uuid | Type::Decimal) {
                return Err(Error::invalid_mapping(format!(
                    "collapse key `{}.{}` must be a uuid or decimal column, found {:?}",
                    class_map.domain_class, collapse_key.key_name, column.ty
                )));
            }
        }

        Ok(())
    }
}
