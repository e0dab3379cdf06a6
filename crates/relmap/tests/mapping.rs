mod support;

use pretty_assertions::assert_eq;
use relmap::stmt::{Expr, ExprLambda, ExprParam, Record, Type, Value};
use uuid::Uuid;

fn patient() -> ExprParam {
    ExprParam::new("p", Type::class("Patient"))
}

fn patient_row() -> ExprParam {
    ExprParam::new("p", Type::class("PatientRow"))
}

/// `p.name.family == family`
fn family_is(family: &str) -> ExprLambda {
    let catalog = support::catalog();
    let name = catalog.member(&patient(), "name").unwrap();
    let body = Expr::eq(catalog.member(name, "family").unwrap(), family);
    ExprLambda::unary(patient(), body)
}

/// `p.identifiers.any(|i| i.value == value)`
fn has_identifier(value: &str) -> ExprLambda {
    let catalog = support::catalog();
    let i = ExprParam::new("i", Type::class("Identifier"));
    let matches = ExprLambda::unary(
        i.clone(),
        Expr::eq(catalog.member(&i, "value").unwrap(), value),
    );
    let identifiers = catalog.member(&patient(), "identifiers").unwrap();
    ExprLambda::unary(patient(), Expr::any(identifiers, Some(matches)))
}

/// A patient and the relational row holding the same data.
fn sample(family: &str, gender: Uuid, identifiers: &[&str]) -> (Value, Value) {
    let business = Record::new("Patient")
        .with("key", Uuid::new_v4())
        .with("gender_key", gender)
        .with("gender", Record::new("Concept").with("key", gender))
        .with("name", Record::new("PersonName").with("family", family))
        .with(
            "identifiers",
            Value::List(
                identifiers
                    .iter()
                    .map(|value| Record::new("Identifier").with("value", *value).into())
                    .collect(),
            ),
        );

    let row = Record::new("PatientRow")
        .with("key", business.get("key").clone())
        .with("gender_concept_key", gender)
        .with(
            "entity",
            Record::new("EntityRow").with("name", Record::new("NameRow").with("family_name", family)),
        )
        .with(
            "identifier_links",
            Value::List(
                identifiers
                    .iter()
                    .map(|value| {
                        Record::new("IdentifierLinkRow")
                            .with("identifier", Record::new("IdentifierRow").with("value", *value))
                            .into()
                    })
                    .collect(),
            ),
        );

    (business.into(), row.into())
}

fn assert_round_trip(predicate: &ExprLambda, samples: &[(Value, Value)]) {
    let mapper = support::mapper();
    let mapped = mapper.map_model_expression(predicate).unwrap();

    for (business, row) in samples {
        assert_eq!(
            mapped.call_bool(std::slice::from_ref(row)).unwrap(),
            predicate.call_bool(std::slice::from_ref(business)).unwrap(),
            "{predicate:?} on {business:?}"
        );
    }
}

fn samples() -> Vec<(Value, Value)> {
    let female = Uuid::from_u128(1);
    let male = Uuid::from_u128(2);

    vec![
        sample("Smith", female, &["MRN-1", "NHS-7"]),
        sample("Jones", male, &["MRN-2"]),
        sample("Smith", male, &[]),
    ]
}

#[test]
fn family_through_via_chain() {
    let mapped = support::mapper().map_model_expression(&family_is("Smith")).unwrap();

    let catalog = support::catalog();
    let entity = catalog.member(&patient_row(), "entity").unwrap();
    let name = catalog.member(entity, "name").unwrap();
    let expected = ExprLambda::unary(
        patient_row(),
        Expr::eq(catalog.member(name, "family_name").unwrap(), "Smith"),
    );

    assert_eq!(mapped, expected);
    assert_round_trip(&family_is("Smith"), &samples());
}

#[test]
fn collapse_key_is_a_column_access() {
    let catalog = support::catalog();
    let gender = Uuid::from_u128(1);

    let nav = catalog.member(&patient(), "gender").unwrap();
    let predicate = ExprLambda::unary(
        patient(),
        Expr::eq(catalog.member(nav, "key").unwrap(), gender),
    );

    let mapped = support::mapper().map_model_expression(&predicate).unwrap();
    let expected = ExprLambda::unary(
        patient_row(),
        Expr::eq(
            catalog.member(&patient_row(), "gender_concept_key").unwrap(),
            gender,
        ),
    );

    assert_eq!(mapped, expected);
    assert_round_trip(&predicate, &samples());
}

#[test]
fn combinator_lambda_is_rebound_to_link_rows() {
    let mapped = support::mapper()
        .map_model_expression(&has_identifier("MRN-1"))
        .unwrap();

    let catalog = support::catalog();
    let link = ExprParam::new("i", Type::class("IdentifierLinkRow"));
    let identifier = catalog.member(&link, "identifier").unwrap();
    // The element keeps the type it had before the hop was inserted
    let matches = ExprLambda::unary(
        link,
        Expr::eq(Expr::member(identifier, "value", Type::String), "MRN-1"),
    );
    let links = catalog.member(&patient_row(), "identifier_links").unwrap();
    let expected = ExprLambda::unary(patient_row(), Expr::any(links, Some(matches)));

    assert_eq!(mapped, expected);
    assert_round_trip(&has_identifier("MRN-1"), &samples());
    assert_round_trip(&has_identifier("missing"), &samples());
}

#[test]
fn where_and_count_over_mapped_collection() {
    let catalog = support::catalog();
    let i = ExprParam::new("i", Type::class("Identifier"));
    let value = catalog.member(&i, "value").unwrap();
    let identifiers = catalog.member(&patient(), "identifiers").unwrap();

    let mrn = ExprLambda::unary(i.clone(), Expr::starts_with(value.clone(), "MRN"));
    let nhs = ExprLambda::unary(i.clone(), Expr::ne(value, "NHS-7"));

    // p.identifiers.where(|i| i.value.starts_with("MRN")).all(|i| i.value != "NHS-7")
    let filtered = Expr::all(Expr::filter(identifiers.clone(), mrn), nhs);
    assert_round_trip(&ExprLambda::unary(patient(), filtered), &samples());

    // p.identifiers.count() >= 2 || p.name.family.to_lower() == "jones"
    let name = catalog.member(&patient(), "name").unwrap();
    let family = catalog.member(name, "family").unwrap();
    let either = Expr::or(
        Expr::ge(Expr::count(identifiers, None), 2i64),
        Expr::eq(Expr::to_lower(family), "jones"),
    );
    assert_round_trip(&ExprLambda::unary(patient(), either), &samples());
}

#[test]
fn null_comparison_keeps_its_literal() {
    let catalog = support::catalog();

    let key = catalog.member(&patient(), "key").unwrap();
    let predicate = ExprLambda::unary(patient(), Expr::ne(key, Expr::null()));
    let mapped = support::mapper().map_model_expression(&predicate).unwrap();

    assert_eq!(
        mapped,
        ExprLambda::unary(
            patient_row(),
            Expr::ne(catalog.member(&patient_row(), "key").unwrap(), Expr::null()),
        )
    );
}

#[test]
fn lambda_over_unmapped_class_is_rejected() {
    let predicate = ExprLambda::unary(
        ExprParam::new("n", Type::class("Nobody")),
        Expr::value(true),
    );

    let err = support::mapper().map_model_expression(&predicate).unwrap_err();
    assert!(err.is_invalid_operation());
}
