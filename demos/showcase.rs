//! Walks, resolves and fills a small request description.

use facet::Facet;
use tagwalk::{
    FieldExt, FieldPath, StructTag, TagwalkError, has_tagged_fields, populate_fields_from_tags,
    tagged_name, type_string, walk_fields_recursively, walk_tagged_fields,
};

#[derive(Facet, Default)]
struct Paging {
    #[facet(query = "limit", fallback = "20")]
    limit: u32,
    #[facet(query = "offset", fallback = "0")]
    offset: u32,
}

#[derive(Facet, Default)]
struct ListUsers {
    #[facet(path = "org", query = "-")]
    org: String,
    #[facet(query = "q", json = "query")]
    search: Option<String>,
    #[facet(flatten)]
    paging: Paging,
}

#[derive(Facet, Default, Debug)]
struct Schema {
    title: String,
    max_length: Option<u32>,
    deprecated: bool,
}

fn main() -> Result<(), TagwalkError> {
    let request = ListUsers::default();
    println!("{}", type_string!(ListUsers));

    for namespace in ["path", "query", "json", "header"] {
        let mut names = Vec::new();
        walk_tagged_fields(&request, namespace, |visited| names.push(visited.name()));
        println!(
            "{namespace:>6}: {names:?} (tagged: {})",
            has_tagged_fields(&request, namespace)
        );
    }

    walk_fields_recursively(&request, |visited| {
        let depth = visited.path.len();
        let fallback = visited.field.tags().lookup("fallback").unwrap_or("-");
        println!(
            "{:indent$}{} ({}) fallback={fallback}",
            "",
            visited.field.name,
            (visited.field.shape)(),
            indent = depth * 2
        );
    });

    let offset = tagged_name(&request, &FieldPath::from("paging.offset"), "query")?;
    println!("paging.offset is known as '{offset}' in queries");

    let mut schema = Schema::default();
    populate_fields_from_tags(
        &mut schema,
        &StructTag::new(r#"title:"User list" MaxLength:"64" deprecated:"f""#),
    )?;
    println!("{schema:?}");

    Ok(())
}
