use facet::Facet;
use tagwalk::{FieldPath, TagwalkErrorKind, tagged_name};

#[derive(Facet, Default)]
struct Embedded {
    #[facet(json = "a")]
    a: i32,
    #[facet(json = "-")]
    untagged: String,
}

#[derive(Facet, Default)]
struct StructWithEmbedded {
    #[facet(path = "b", json = "-")]
    b: i32,
    #[facet(flatten)]
    embedded: Embedded,
}

#[derive(Facet, Default)]
struct StructWithTaggedEmbedded {
    #[facet(path = "b", json = "-")]
    b: i32,
    #[facet(flatten)]
    #[facet(json = "emb")]
    embedded: Embedded,
}

#[derive(Facet, Default)]
struct StructWithIgnoredEmbedded {
    #[facet(path = "b", json = "-")]
    b: i32,
    #[facet(flatten)]
    #[facet(json = "-")]
    embedded: Embedded,
}

#[derive(Facet, Default)]
struct Data {
    #[facet(json = "deeper")]
    deeper: StructWithEmbedded,
}

#[derive(Facet, Default)]
struct StructWithInline {
    #[facet(json = "data")]
    data: Data,
}

fn is_unreachable<T: Facet<'static>>(root: &T, path: &str, namespace: &str) -> bool {
    let error = tagged_name(root, &FieldPath::from(path), namespace).unwrap_err();
    matches!(error.kind(), TagwalkErrorKind::UnreachableField { .. })
}

#[test]
fn resolves_direct_fields() {
    let value = StructWithEmbedded::default();
    assert_eq!(tagged_name(&value, &"b".into(), "path").unwrap(), "b");
}

#[test]
fn resolves_flattened_fields_by_their_declared_path() {
    let value = StructWithEmbedded::default();
    let name = tagged_name(&value, &FieldPath::from(["embedded", "a"]), "json").unwrap();
    assert_eq!(name, "a");

    // the embedded field is not addressable by its children's names alone
    assert!(is_unreachable(&value, "a", "json"));
}

#[test]
fn tagged_embedded_field_resolves_to_its_tag() {
    let value = StructWithTaggedEmbedded::default();
    assert_eq!(tagged_name(&value, &"embedded".into(), "json").unwrap(), "emb");
    assert!(is_unreachable(&value, "embedded.a", "json"));
}

#[test]
fn ignored_fields_are_unreachable() {
    let value = StructWithEmbedded::default();
    assert!(is_unreachable(&value, "b", "json"));
    assert!(is_unreachable(&value, "embedded.untagged", "json"));

    let value = StructWithIgnoredEmbedded::default();
    assert!(is_unreachable(&value, "embedded", "json"));
    assert!(is_unreachable(&value, "embedded.a", "json"));
    assert_eq!(tagged_name(&value, &"b".into(), "path").unwrap(), "b");
}

#[test]
fn untagged_fields_are_unreachable_under_a_namespace() {
    let value = StructWithEmbedded::default();
    assert!(is_unreachable(&value, "embedded.a", "query"));
    assert!(is_unreachable(&value, "missing", "json"));
}

#[test]
fn empty_namespace_resolves_declared_names() {
    let value = StructWithIgnoredEmbedded::default();
    assert_eq!(tagged_name(&value, &"b".into(), "").unwrap(), "b");
    assert_eq!(
        tagged_name(&value, &"embedded.untagged".into(), "").unwrap(),
        "untagged"
    );
}

#[test]
fn named_struct_fields_are_leaves() {
    let value = StructWithInline::default();
    assert_eq!(tagged_name(&value, &"data".into(), "json").unwrap(), "data");
    assert_eq!(
        tagged_name(&value.data, &"deeper".into(), "json").unwrap(),
        "deeper"
    );
    assert!(is_unreachable(&value, "data.deeper", "json"));

    // resolving inside a sub-struct takes that sub-struct as the root
    assert_eq!(
        tagged_name(&value.data.deeper, &"embedded.a".into(), "json").unwrap(),
        "a"
    );
}

#[test]
fn roots_behind_pointers() {
    let boxed = Box::new(StructWithEmbedded::default());
    assert_eq!(
        tagged_name(&boxed, &"embedded.a".into(), "json").unwrap(),
        "a"
    );
}

#[test]
fn error_messages() {
    let value = StructWithEmbedded::default();
    let error = tagged_name(&value, &"b".into(), "json").unwrap_err();
    assert_eq!(
        error.to_string(),
        "field 'b' is not reachable under namespace 'json'"
    );
    match error.into_kind() {
        TagwalkErrorKind::UnreachableField { path, namespace } => {
            assert_eq!(path.segments(), ["b"]);
            assert_eq!(namespace, "json");
        }
        kind => panic!("unexpected error: {kind:?}"),
    }

    let error = tagged_name(&7u8, &"b".into(), "json").unwrap_err();
    assert_eq!(error.to_string(), "struct expected, u8 received");

    let error = tagged_name(&vec![1u8], &"b".into(), "json").unwrap_err();
    assert!(matches!(
        error.kind(),
        TagwalkErrorKind::WrongShape { expected: "struct", .. }
    ));
}

#[test]
fn field_paths() {
    let path: FieldPath = "embedded.a".parse().unwrap();
    assert_eq!(path, FieldPath::from(["embedded", "a"]));
    assert_eq!(path, FieldPath::new(["embedded", "a"]));
    assert_eq!(path.to_string(), "embedded.a");
    assert_eq!(FieldPath::from(&["x", "y"][..]).segments(), ["x", "y"]);
}
