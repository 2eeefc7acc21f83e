#![cfg(feature = "kdl")]

use indoc::indoc;
use kdl::{KdlDocument, KdlNode};
use facet::Facet;
use tagwalk::{TagSource, populate_fields_from_tags};

#[derive(Facet, Default, Debug, PartialEq)]
struct Parameter {
    title: String,
    desc: Option<String>,
    min: Option<f64>,
    max_length: u32,
    deprecated: bool,
    required: Option<bool>,
}

fn node<'a>(document: &'a KdlDocument, name: &str) -> &'a KdlNode {
    document
        .nodes()
        .iter()
        .find(|node| node.name().value() == name)
        .unwrap()
}

#[test]
fn populates_from_node_properties() {
    let kdl = indoc! {r#"
        parameter title="Page size" desc="Number of items per page" min=-1.5 maxLength=64 deprecated=#true required=#false
    "#};
    let document: KdlDocument = kdl.parse().unwrap();

    let mut parameter = Parameter::default();
    populate_fields_from_tags(&mut parameter, node(&document, "parameter")).unwrap();

    assert_eq!(
        parameter,
        Parameter {
            title: "Page size".to_owned(),
            desc: Some("Number of items per page".to_owned()),
            min: Some(-1.5),
            max_length: 64,
            deprecated: true,
            required: Some(false),
        }
    );
}

#[test]
fn null_properties_are_absent() {
    let kdl = indoc! {r#"
        parameter title="t" desc=#null required=#null
    "#};
    let document: KdlDocument = kdl.parse().unwrap();
    let parameter_node = node(&document, "parameter");

    assert!(parameter_node.lookup_tag("desc").is_none());
    assert!(parameter_node.lookup_tag("missing").is_none());

    let mut parameter = Parameter::default();
    populate_fields_from_tags(&mut parameter, parameter_node).unwrap();
    assert_eq!(parameter.title, "t");
    assert_eq!(parameter.desc, None);
    assert_eq!(parameter.required, None);
}

#[test]
fn arguments_are_not_properties() {
    let kdl = indoc! {r#"
        parameter "title" maxLength=3
    "#};
    let document: KdlDocument = kdl.parse().unwrap();

    let mut parameter = Parameter::default();
    populate_fields_from_tags(&mut parameter, node(&document, "parameter")).unwrap();
    assert_eq!(parameter.title, "");
    assert_eq!(parameter.max_length, 3);
}

#[test]
fn last_duplicate_property_wins() {
    let kdl = indoc! {r#"
        parameter maxLength=1 maxLength=7
    "#};
    let document: KdlDocument = kdl.parse().unwrap();
    let parameter_node = node(&document, "parameter");

    assert_eq!(parameter_node.lookup_tag("maxLength").as_deref(), Some("7"));
}

#[test]
fn property_names_match_in_any_case() {
    let kdl = indoc! {r#"
        parameter TITLE="loud" MaxLength=12
    "#};
    let document: KdlDocument = kdl.parse().unwrap();
    let parameter_node = node(&document, "parameter");

    assert!(parameter_node.lookup_tag("title").is_none());
    let (key, value) = parameter_node.lookup_tag_ignore_case("title").unwrap();
    assert_eq!((key.as_ref(), value.as_ref()), ("TITLE", "loud"));

    let mut parameter = Parameter::default();
    populate_fields_from_tags(&mut parameter, parameter_node).unwrap();
    assert_eq!(parameter.title, "loud");
    assert_eq!(parameter.max_length, 12);
}

#[test]
fn bad_property_values_are_reported() {
    let kdl = indoc! {r#"
        parameter maxLength="many" deprecated="maybe" title="kept"
    "#};
    let document: KdlDocument = kdl.parse().unwrap();

    let mut parameter = Parameter::default();
    let error =
        populate_fields_from_tags(&mut parameter, node(&document, "parameter")).unwrap_err();
    assert_eq!(
        error.to_string(),
        "failed to parse uint value many in tag maxLength: invalid digit found in string, \
         failed to parse bool value maybe in tag deprecated: invalid boolean literal"
    );
    assert_eq!(parameter.title, "kept");
}
