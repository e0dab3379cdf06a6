mod rewrite;
use rewrite::ModelExpressionVisitor;

use relmap_core::{
    schema::{ClassMap, CollapseKey, ModelMap, Relation},
    stmt::{Expr, ExprLambda, ExprMember, ExprParam, Method, Record, Type, Value},
    Catalog, Error, Result,
};
use std::collections::HashMap;

/// Resolves business-model classes and members to their relational
/// counterparts.
///
/// The mapping document is verified against the catalog when the mapper is
/// built, and its class maps are indexed by business class once.
#[derive(Debug)]
pub struct ModelMapper {
    catalog: Catalog,
    map: ModelMap,

    /// Business class name to index into `map.classes`
    index: HashMap<String, usize>,
}

impl ModelMapper {
    pub fn new(catalog: Catalog, map: ModelMap) -> Result<ModelMapper> {
        map.verify(&catalog)?;

        let mut index = HashMap::new();
        for (i, class_map) in map.classes.iter().enumerate() {
            index.entry(class_map.model_class.clone()).or_insert(i);
        }

        Ok(ModelMapper {
            catalog,
            map,
            index,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model_map(&self) -> &ModelMap {
        &self.map
    }

    pub fn class_map(&self, model_class: &str) -> Option<&ClassMap> {
        self.index.get(model_class).map(|&i| &self.map.classes[i])
    }

    /// Like [`ModelMapper::class_map`], failing with an invalid-operation
    /// error naming the unmapped class.
    pub fn expect_class_map(&self, model_class: &str) -> Result<&ClassMap> {
        self.class_map(model_class).ok_or_else(|| {
            Error::invalid_operation(format!("no class map for `{model_class}`"))
        })
    }

    /// The relational type a business type maps to. Unmapped types map to
    /// themselves.
    pub fn map_model_type(&self, ty: &Type) -> Result<Type> {
        Ok(match ty {
            Type::Class(name) => match self.class_map(name) {
                Some(class_map) => {
                    self.catalog.expect_class(&class_map.domain_class)?;
                    Type::class(&class_map.domain_class)
                }
                None => ty.clone(),
            },
            Type::Nullable(inner) => Type::nullable(self.map_model_type(inner)?),
            Type::Generic { name, args } => Type::Generic {
                name: name.clone(),
                args: args
                    .iter()
                    .map(|arg| self.map_model_type(arg))
                    .collect::<Result<_>>()?,
            },
            ty => ty.clone(),
        })
    }

    /// The element type of a single-argument container; any other type is
    /// returned as is.
    pub fn extract_domain_type(&self, ty: &Type) -> Result<Type> {
        match ty.non_nullable() {
            Type::Generic { args, .. } if args.len() == 1 => Ok(args[0].clone()),
            Type::Generic { name, args } => Err(Error::invalid_operation(format!(
                "cannot extract the element type of {name} with {} type arguments",
                args.len()
            ))),
            ty => Ok(ty.clone()),
        }
    }

    /// The collapse key that turns `member` into a foreign-key column
    /// access, if `member` is the key of a navigation that declares one.
    pub fn collapse_key(&self, member: &ExprMember) -> Option<&CollapseKey> {
        let Expr::Member(navigation) = &*member.receiver else {
            return None;
        };

        let target = navigation.ty.as_class()?;
        let key = self
            .catalog
            .class(target)
            .map(|class| class.key.as_str())
            .unwrap_or("key");

        if member.name != key {
            return None;
        }

        let owner = navigation.receiver.ty();
        self.class_map(owner.as_class()?)?
            .collapse_key_for(&navigation.name)
    }

    /// Produces the relational access for the business member access
    /// `member`, given `access`, its rewritten receiver.
    ///
    /// Resolution order:
    ///
    /// 1. `.key` of a navigation with a collapse key becomes the foreign-key
    ///    column. `access` is then the rewritten owner of the navigation.
    /// 2. A property map becomes the mapped property, followed through its
    ///    `via` hops up to the first collection.
    /// 3. Otherwise the property of the same name on the relational class.
    pub fn map_model_member(&self, member: &ExprMember, access: Expr) -> Result<Expr> {
        if let Some(collapse_key) = self.collapse_key(member) {
            return self.catalog.member(access, &collapse_key.key_name);
        }

        let property_map = member
            .declaring_class()
            .and_then(|class| self.class_map(&class))
            .and_then(|class_map| class_map.property_map(&member.name));

        let Some(property_map) = property_map else {
            return self.catalog.member(access, &member.name);
        };

        let mut access = access;
        for hop in property_map.hops() {
            if access.ty().is_collection() {
                break;
            }
            access = self.catalog.member(access, hop)?;
        }

        Ok(access)
    }

    /// The expression a collection lambda's parameter stands for after
    /// `root`, a mapped collection access, is rewritten: the `via` hops
    /// left over once the collection was reached, applied to `param`.
    pub fn create_lambda_member_adjustment_expression(
        &self,
        root: &Expr,
        param: &ExprParam,
    ) -> Result<Expr> {
        let mut root = root;
        while let Expr::Call(call) = root {
            if call.method != Method::Where {
                break;
            }
            root = &call.receiver;
        }

        let mut access = Expr::from(param);

        let Expr::Member(member) = root else {
            return Ok(access);
        };

        let property_map = member
            .declaring_class()
            .and_then(|class| self.class_map(&class))
            .and_then(|class_map| class_map.property_map(&member.name));

        let Some(property_map) = property_map else {
            return Ok(access);
        };

        // Hops up to and including the collection were applied to the
        // receiver; the rest apply to each element.
        let mut ty = self.map_model_type(&member.receiver.ty())?;
        let mut remaining = property_map.hops().peekable();

        while let Some(hop) = remaining.next() {
            let class = ty.as_class().ok_or_else(|| {
                Error::invalid_operation(format!("`{hop}` accessed on {ty:?}"))
            })?;
            let property = self
                .catalog
                .property(class, hop)
                .ok_or_else(|| Error::missing_member(class, hop))?;

            if property.ty.is_collection() {
                break;
            }
            ty = property.ty.clone();
        }

        for hop in remaining {
            access = self.catalog.member(access, hop)?;
        }

        Ok(access)
    }

    /// Rewrites a predicate over a business class into the equivalent
    /// predicate over its relational class.
    pub fn map_model_expression(&self, predicate: &ExprLambda) -> Result<ExprLambda> {
        let param = predicate
            .param()
            .ok_or_else(|| Error::invalid_operation("a predicate takes exactly one parameter"))?;

        let model_class = param.ty.as_class().ok_or_else(|| {
            Error::invalid_operation(format!(
                "predicate parameter `{}` is not a business class",
                param.name
            ))
        })?;

        let class_map = self.expect_class_map(model_class)?;
        let target = ExprParam::new(&param.name, Type::class(&class_map.domain_class));

        let mut visitor = ModelExpressionVisitor::new(self, vec![target.clone()]);
        let body = visitor.rewrite(&predicate.body)?;

        Ok(ExprLambda::unary(target, body))
    }

    /// The relational column holding the business property `property`,
    /// when it is stored in the class's own row.
    pub fn column(&self, model_class: &str, property: &str) -> Option<String> {
        let class_map = self.class_map(model_class)?;

        if let Some(property_map) = class_map.property_map(property) {
            return property_map
                .via
                .is_empty()
                .then(|| property_map.domain_name.clone());
        }

        // A foreign key whose navigation collapses onto a column
        let class = self.catalog.class(model_class)?;
        let collapsed = class.navigations().find_map(|navigation| match &navigation.relation {
            Some(Relation::BelongsTo { key }) if key == property => {
                class_map.collapse_key_for(&navigation.name)
            }
            _ => None,
        });

        if let Some(collapse_key) = collapsed {
            return Some(collapse_key.key_name.clone());
        }

        self.catalog
            .property(&class_map.domain_class, property)
            .filter(|column| !column.is_navigation())
            .map(|column| column.name.clone())
    }

    /// The relational row holding the stored properties of `record`.
    pub fn to_row(&self, record: &Record) -> Result<Record> {
        let class_map = self.expect_class_map(&record.class)?;
        let class = self.catalog.expect_class(&record.class)?;
        let mut row = Record::new(&class_map.domain_class);

        for property in class.scalar_properties() {
            let Some(value) = record.fields.get(&property.name) else {
                continue;
            };

            if let Some(column) = self.column(&record.class, &property.name) {
                row.set(column, value.clone());
            }
        }

        Ok(row)
    }

    /// The business object stored in `row`. Navigations are left unset.
    pub fn to_model(&self, model_class: &str, row: &Record) -> Result<Record> {
        let class = self.catalog.expect_class(model_class)?;
        let mut record = Record::new(model_class);

        for property in class.scalar_properties() {
            let Some(column) = self.column(model_class, &property.name) else {
                continue;
            };

            let value = row.fields.get(&column).cloned().unwrap_or(Value::Null);
            record.set(&property.name, value);
        }

        Ok(record)
    }
}
