use pretty_assertions::assert_eq;
use route_docs::{
    documentation::{Body, DocumentationType, Field, Object},
    shape::{reflect, DocumentationObject, EnumCase, ShapeBody, ANY_KEY, COMPRESSED_SEQUENCE_KEY},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::ops::RangeInclusive;

#[derive(Deserialize)]
#[allow(dead_code)]
struct Main {
    bool: bool,
    sub1: Sub1,
    sub2: Sub2,
    sub3: Sub3,
    #[serde(rename = "optSub3")]
    opt_sub3: Option<Sub3>,
    sub4: Sub4,
    #[serde(rename = "arbitraryDict")]
    arbitrary_dict: HashMap<String, i64>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Sub1 {
    string: String,
    int: i64,
    #[serde(rename = "doubles")]
    double_array: Vec<f64>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Sub2 {
    optional: Option<i64>,
    #[serde(rename = "doubleOptional")]
    double_optional: Option<Option<String>>,
    #[serde(rename = "intRange")]
    int_range: RangeInclusive<i64>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
enum Sub3 {
    #[serde(rename = "a")]
    A,
    #[serde(rename = "b")]
    B,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Sub4 {
    int: i64,
    #[serde(rename = "recursiveArray")]
    recursive_array: Vec<Sub4>,
}

fn sub3_cases() -> Vec<EnumCase> {
    vec![EnumCase::new(None, "a"), EnumCase::new(None, "b")]
}

/// `Sub4` nested `depth` more times below the returned node
fn expected_sub4(depth: usize) -> DocumentationObject {
    let array = if depth == 0 {
        DocumentationObject::of::<Vec<Sub4>>()
    } else {
        DocumentationObject::of::<Vec<Sub4>>().field(COMPRESSED_SEQUENCE_KEY, expected_sub4(depth - 1))
    };
    DocumentationObject::of::<Sub4>()
        .field("int", DocumentationObject::of::<i64>())
        .field("recursiveArray", array)
}

#[test]
fn test_reflect_nested_record() {
    let documentation = reflect::<Main>().expect("Failed to reflect Main");

    let expected = DocumentationObject::of::<Main>()
        .field("bool", DocumentationObject::of::<bool>())
        .field(
            "sub1",
            DocumentationObject::of::<Sub1>()
                .field("int", DocumentationObject::of::<i64>())
                .field("string", DocumentationObject::of::<String>())
                .field(
                    "doubles",
                    DocumentationObject::of::<Vec<f64>>()
                        .field(COMPRESSED_SEQUENCE_KEY, DocumentationObject::of::<f64>()),
                ),
        )
        .field(
            "sub2",
            DocumentationObject::of::<Sub2>()
                .field("optional", DocumentationObject::of::<Option<i64>>())
                .field("doubleOptional", DocumentationObject::of::<Option<Option<String>>>())
                .field(
                    "intRange",
                    DocumentationObject::of::<RangeInclusive<i64>>()
                        .field("start", DocumentationObject::of::<i64>())
                        .field("end", DocumentationObject::of::<i64>()),
                ),
        )
        .field("sub3", DocumentationObject::of::<Sub3>().cases(sub3_cases()))
        .field("optSub3", DocumentationObject::of::<Option<Sub3>>().cases(sub3_cases()))
        .field("sub4", expected_sub4(3))
        .field(
            "arbitraryDict",
            DocumentationObject::of::<HashMap<String, i64>>().field(ANY_KEY, DocumentationObject::of::<i64>()),
        );

    assert_eq!(documentation, expected);
}

#[test]
fn test_optionality() {
    assert!(!DocumentationObject::of::<i64>().is_optional());
    assert!(DocumentationObject::of::<Option<i64>>().is_optional());
    assert!(DocumentationObject::of::<Option<Option<String>>>().is_optional());
    assert!(!DocumentationObject::of::<Vec<Option<u8>>>().is_optional());
}

#[test]
fn test_field_order_does_not_matter() {
    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Forward {
        f1: i64,
        f2: String,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Backward {
        f2: String,
        f1: i64,
    }

    let forward = reflect::<Forward>().unwrap();
    let backward = reflect::<Backward>().unwrap();
    assert_eq!(forward.fields(), backward.fields());
    assert_eq!(forward.body(), backward.body());

    let Body::Fields(fields) = Object::reflect::<Backward>().unwrap().body else {
        panic!("expected fields");
    };
    assert_eq!(
        fields,
        vec![
            Field::new("f1", DocumentationType::of::<i64>(), false),
            Field::new("f2", DocumentationType::of::<String>(), false),
        ]
    );
}

#[test]
fn test_heterogeneous_positions_are_not_compressed() {
    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Positions {
        pair: (i64, i64),
        mixed: (i64, String, i64),
    }

    let documentation = reflect::<Positions>().unwrap();
    let fields = documentation.fields().unwrap();

    let pair = fields["pair"].fields().unwrap();
    assert_eq!(pair.keys().collect::<Vec<_>>(), vec!["0", "1"]);

    let mixed = fields["mixed"].fields().unwrap();
    assert_eq!(mixed.keys().collect::<Vec<_>>(), vec!["0", "1", "2"]);
    assert_eq!(mixed["1"], DocumentationObject::of::<String>());
}

#[test]
fn test_nested_enum_without_recorded_payload() {
    #[derive(Deserialize)]
    #[allow(dead_code)]
    enum Shape {
        Circle { radius: f64 },
        Square(f64),
    }

    let documentation = reflect::<Vec<Shape>>().unwrap();
    let element = &documentation.fields().unwrap()[COMPRESSED_SEQUENCE_KEY];
    assert_eq!(
        element.body(),
        &ShapeBody::Cases(vec![EnumCase::new(None, "Circle"), EnumCase::new(None, "Square")])
    );
}

#[cfg(all(feature = "chrono", feature = "uuid"))]
#[test]
fn test_library_types_are_opaque() {
    use chrono::{DateTime, Utc};
    use std::ops::Range;
    use uuid::Uuid;

    #[derive(Deserialize)]
    #[allow(dead_code)]
    #[serde(rename_all = "camelCase")]
    struct Event {
        date: DateTime<Utc>,
        optional_uuid: Option<Uuid>,
        date_range: Range<DateTime<Utc>>,
    }

    let documentation = reflect::<Event>().unwrap();
    let expected = DocumentationObject::of::<Event>()
        .field("date", DocumentationObject::of::<DateTime<Utc>>())
        .field("optionalUuid", DocumentationObject::of::<Option<Uuid>>())
        .field(
            "dateRange",
            DocumentationObject::of::<Range<DateTime<Utc>>>()
                .field("start", DocumentationObject::of::<DateTime<Utc>>())
                .field("end", DocumentationObject::of::<DateTime<Utc>>()),
        );
    assert_eq!(documentation, expected);
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Search {
    #[serde(flatten)]
    filter: Filter,
    limit: u32,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Filter {
    query: String,
    tags: Vec<String>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Page {
    search: Search,
    cursor: Option<String>,
}

#[test]
fn test_flattened_fields_are_listed_with_outer_fields() {
    let documentation = reflect::<Search>().unwrap();
    let fields = documentation.fields().unwrap();
    assert_eq!(
        fields.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["limit", "query", "tags"]
    );
    assert_eq!(fields["limit"], DocumentationObject::of::<u32>());

    // Containers replay the sample recorded for the cached root
    let page = reflect::<Page>().unwrap();
    assert_eq!(page.fields().unwrap()["search"], documentation);
}

#[derive(Deserialize, Debug, PartialEq)]
#[allow(dead_code)]
#[serde(tag = "type")]
enum Event {
    Created { id: u64 },
    Deleted { id: u64 },
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Feed {
    latest: Event,
    history: Vec<Event>,
}

#[test]
fn test_internally_tagged_enum() {
    let documentation = reflect::<Event>().unwrap();
    assert_eq!(documentation, DocumentationObject::of::<Event>());

    let feed = reflect::<Feed>().unwrap();
    let fields = feed.fields().unwrap();
    assert_eq!(fields["latest"], documentation);
    assert_eq!(
        fields["history"],
        DocumentationObject::of::<Vec<Event>>().field(COMPRESSED_SEQUENCE_KEY, documentation.clone())
    );
}

#[derive(Deserialize)]
#[allow(dead_code)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Change {
    Renamed { from: String, to: String },
    Removed { at: u64 },
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Changelog {
    changes: Vec<Change>,
    last: Option<Change>,
}

#[test]
fn test_internally_tagged_enum_first_seen_in_containers() {
    let documentation = reflect::<Changelog>().unwrap();
    let fields = documentation.fields().unwrap();
    assert_eq!(
        fields["changes"],
        DocumentationObject::of::<Vec<Change>>().field(COMPRESSED_SEQUENCE_KEY, DocumentationObject::of::<Change>())
    );
    assert_eq!(fields["last"], DocumentationObject::of::<Option<Change>>());
    assert!(fields["last"].is_optional());
}

#[derive(Deserialize, Debug, PartialEq)]
#[allow(dead_code)]
#[serde(untagged)]
enum IdOrName {
    Id(u64),
    Name(String),
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Lookup {
    key: IdOrName,
    fallback: Option<IdOrName>,
}

#[test]
fn test_untagged_enum() {
    let documentation = reflect::<Lookup>().unwrap();
    let fields = documentation.fields().unwrap();
    assert_eq!(fields["key"], DocumentationObject::of::<IdOrName>());
    assert_eq!(fields["fallback"], DocumentationObject::of::<Option<IdOrName>>());

    assert_eq!(reflect::<IdOrName>().unwrap(), DocumentationObject::of::<IdOrName>());
}

#[test]
fn test_function_pointer_markers() {
    use std::marker::PhantomData;

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Marked {
        id: u32,
        marker: PhantomData<fn() -> u8>,
    }

    let documentation = reflect::<Marked>().unwrap();
    assert_eq!(
        documentation.fields().unwrap()["marker"],
        DocumentationObject::of::<PhantomData<fn() -> u8>>()
    );

    let Body::Fields(fields) = Object::reflect::<Marked>().unwrap().body else {
        panic!("expected fields");
    };
    let marker = fields.iter().find(|field| field.name == "marker").unwrap();
    assert_eq!(marker.ty.docs_name(), "PhantomData<Fn<u8>>");
}
