use std::{collections::HashMap, rc::Rc, sync::Arc};

use tagwalk::{NamedParts, type_string, type_string_in, type_string_of, type_string_of_val};

struct TestSampleStruct {
    a: i32,
}

struct Wrapper<T> {
    inner: T,
}

mod first {
    pub struct Sample;
}

mod second {
    pub struct Sample(pub u8);
}

#[test]
fn named_types_carry_their_module_path() {
    // test crates are named after their file, not after the package
    assert_eq!(
        type_string!(TestSampleStruct),
        "tagwalk#type_name::TestSampleStruct"
    );
    assert_eq!(
        type_string!(first::Sample),
        "tagwalk#type_name::first::Sample"
    );

    // without a package there is nothing to disambiguate
    assert_eq!(
        type_string_of::<TestSampleStruct>(),
        "type_name::TestSampleStruct"
    );
    assert_eq!(
        type_string_in::<TestSampleStruct>("type-name", module_path!()),
        "type_name::TestSampleStruct"
    );
}

#[test]
fn same_identifier_in_different_modules() {
    assert_ne!(type_string!(first::Sample), type_string!(second::Sample));
    assert_eq!(second::Sample(1).0, 1);
}

#[test]
fn named_parts_of_test_types() {
    let name = type_string!(Wrapper<first::Sample>);
    assert_eq!(
        name,
        "tagwalk#type_name::Wrapper<tagwalk#type_name::first::Sample>"
    );
    assert_eq!(
        name.named_parts(),
        Some(NamedParts {
            package: Some("tagwalk"),
            module_path: "type_name",
            type_identifier: "Wrapper",
        })
    );
}

#[test]
fn references_prefix_the_referent() {
    let plain = type_string!(TestSampleStruct);
    assert_eq!(
        type_string!(&TestSampleStruct).as_str(),
        format!("&{plain}")
    );
    assert_eq!(
        type_string!(&&mut TestSampleStruct).as_str(),
        format!("&&mut {plain}")
    );
}

#[test]
fn smart_pointers_and_collections() {
    assert_eq!(
        type_string!(Box<TestSampleStruct>),
        "Box<tagwalk#type_name::TestSampleStruct>"
    );
    assert_eq!(type_string_of::<Rc<String>>(), "Rc<String>");
    assert_eq!(type_string_of::<Arc<Vec<u8>>>(), "Arc<Vec<u8>>");
    assert_eq!(
        type_string_of::<HashMap<String, Option<i64>>>(),
        "HashMap<String, Option<i64>>"
    );
    assert_eq!(type_string_of::<[&str]>(), "[&str]");
    assert_eq!(type_string!(Wrapper<i32>), "tagwalk#type_name::Wrapper<i32>");
}

#[test]
fn names_are_stable() {
    let value = Wrapper {
        inner: Some(Box::new(TestSampleStruct { a: 3 })),
    };
    let first = type_string_of_val(&value);
    let second = type_string_of::<Wrapper<Option<Box<TestSampleStruct>>>>();
    assert_eq!(first, second);
    assert_eq!(
        first,
        "type_name::Wrapper<Option<Box<type_name::TestSampleStruct>>>"
    );
    assert_eq!(value.inner.map(|sample| sample.a), Some(3));
}
