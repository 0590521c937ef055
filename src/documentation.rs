//! Public documentation model.
//!
//! Converts the raw shape trees produced by [`crate::shape`] into the flat, sorted and
//! deduplicated structures shown to readers: every payload lists the objects it is made of,
//! each with its fields or enum cases.

use crate::error::{Error, Result};
use crate::registry;
use crate::route::{HttpMethod, RouteInfo};
use crate::shape::{self, DocumentationObject, EnumCase, Reflector, ShapeBody};
use crate::type_identity::{NameOptions, TypeIdentity};
use crate::wrapping;
use log::debug;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Indentation of fields and cases in the textual rendering
const INDENT: &str = "   ";

/// A documented type together with its optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationType {
    /// Structured identity of the type
    pub type_description: TypeIdentity,
    /// Name registered through [`crate::registry::CustomDocumentationNamed`]
    pub custom_name: Option<String>,
}

impl DocumentationType {
    /// Describe `identity`, picking up its registered custom name
    pub fn new(identity: TypeIdentity) -> Self {
        let custom_name = registry::custom_name(&identity);
        Self {
            type_description: identity,
            custom_name,
        }
    }

    pub fn of<T: ?Sized>() -> Self {
        Self::new(TypeIdentity::of::<T>())
    }

    /// The custom name, or the fully qualified type name
    pub fn default_name(&self) -> String {
        self.custom_name
            .clone()
            .unwrap_or_else(|| self.type_description.type_name(NameOptions::FULL))
    }

    /// The custom name, or the type name with its parents but without its module
    pub fn docs_name(&self) -> String {
        self.custom_name
            .clone()
            .unwrap_or_else(|| self.type_description.type_name(NameOptions::PARENTS))
    }
}

impl fmt::Display for DocumentationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.default_name())
    }
}

/// A named member of a record-shaped object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Field name as it appears on the wire
    pub name: String,
    /// Type of the field with optional and wrapping layers removed
    #[serde(rename = "type")]
    pub ty: DocumentationType,
    /// Whether the field may be absent
    pub is_optional: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: DocumentationType, is_optional: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            is_optional,
        }
    }

    fn from_node(name: &str, node: &DocumentationObject) -> Self {
        let identity = node.ty().identity();
        let cleaned = wrapping::leaf_type(&wrapping::strip_optional(&identity));
        Self::new(name, DocumentationType::new(cleaned), node.is_optional())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)?;
        if self.is_optional {
            f.write_str("?")?;
        }
        Ok(())
    }
}

impl fmt::Display for EnumCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{}: ", name)?;
        }
        f.write_str(&self.value)
    }
}

/// Contents of a documented object.
///
/// On the wire a body is a record of three sibling keys: `isEmpty`, `fields` and `cases`.
/// At most one of `fields` and `cases` is non-null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Body {
    #[default]
    Empty,
    Fields(Vec<Field>),
    Cases(Vec<EnumCase>),
}

impl Body {
    fn from_shape(body: &ShapeBody) -> Self {
        match body {
            ShapeBody::None => Body::Empty,
            ShapeBody::Fields(fields) => Body::Fields(
                fields
                    .iter()
                    .map(|(name, node)| Field::from_node(name, node))
                    .collect(),
            ),
            ShapeBody::Cases(cases) => {
                let mut cases = cases.clone();
                cases.sort_by(|a, b| (&a.value, &a.name).cmp(&(&b.value, &b.name)));
                Body::Cases(cases)
            }
        }
    }

    /// Whether there is nothing to list
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Fields(fields) => fields.is_empty(),
            Body::Cases(cases) => cases.is_empty(),
        }
    }

    /// Remove the fields, and the named cases, whose name is in `names`
    pub fn filter_fields(&self, names: &[&str]) -> Self {
        match self {
            Body::Empty => Body::Empty,
            Body::Fields(fields) => Body::Fields(
                fields
                    .iter()
                    .filter(|field| !names.contains(&field.name.as_str()))
                    .cloned()
                    .collect(),
            ),
            Body::Cases(cases) => Body::Cases(
                cases
                    .iter()
                    .filter(|case| !matches!(&case.name, Some(name) if names.contains(&name.as_str())))
                    .cloned()
                    .collect(),
            ),
        }
    }
}

/// Serialize the three sibling keys shared by every body representation
pub(crate) fn serialize_body_parts<S, F, C>(
    serializer: S,
    is_empty: bool,
    fields: Option<&[F]>,
    cases: Option<&[C]>,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    F: Serialize,
    C: Serialize,
{
    let mut state = serializer.serialize_struct("Body", 3)?;
    state.serialize_field("isEmpty", &is_empty)?;
    state.serialize_field("fields", &fields)?;
    state.serialize_field("cases", &cases)?;
    state.end()
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Body::Empty => serialize_body_parts::<_, Field, EnumCase>(serializer, true, None, None),
            Body::Fields(fields) => {
                serialize_body_parts::<_, _, EnumCase>(serializer, false, Some(fields.as_slice()), None)
            }
            Body::Cases(cases) => {
                serialize_body_parts::<_, Field, _>(serializer, false, None, Some(cases.as_slice()))
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BodyRepr {
    is_empty: bool,
    #[serde(default)]
    fields: Option<Vec<Field>>,
    #[serde(default)]
    cases: Option<Vec<EnumCase>>,
}

impl<'de> Deserialize<'de> for Body {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = BodyRepr::deserialize(deserializer)?;
        if repr.is_empty {
            Ok(Body::Empty)
        } else if let Some(fields) = repr.fields {
            Ok(Body::Fields(fields))
        } else if let Some(cases) = repr.cases {
            Ok(Body::Cases(cases))
        } else {
            Err(serde::de::Error::missing_field("cases"))
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Fields(fields) if fields.is_empty() => f.write_str("Fields (empty)"),
            Body::Cases(cases) if cases.is_empty() => f.write_str("Cases (empty)"),
            Body::Fields(fields) => {
                writeln!(f, "Fields {{")?;
                for field in fields {
                    writeln!(f, "{}{}", INDENT, field)?;
                }
                f.write_str("}")
            }
            Body::Cases(cases) => {
                writeln!(f, "Cases {{")?;
                for case in cases {
                    writeln!(f, "{}- {}", INDENT, case)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// One documented type of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Object {
    #[serde(rename = "type")]
    pub ty: DocumentationType,
    pub body: Body,
}

impl Object {
    pub fn new(ty: DocumentationType, body: Body) -> Self {
        Self { ty, body }
    }

    fn from_node(node: &DocumentationObject) -> Self {
        let leaf = wrapping::leaf_type(&node.ty().identity());
        Self::new(DocumentationType::new(leaf), Body::from_shape(node.body()))
    }

    /// Flatten a shape tree into the list of objects it references.
    ///
    /// The root comes first, the rest follows depth-first in field name order. Objects
    /// equal to one already listed are skipped, as are empty-bodied copies of a listed type.
    pub fn objects_from(documentation: &DocumentationObject) -> Vec<Object> {
        let mut objects = Vec::new();
        collect_objects(documentation, &mut objects);
        debug!(
            "Collected {} objects from the shape of {}",
            objects.len(),
            documentation.ty()
        );
        objects
    }

    /// The root object of `T`'s shape
    pub fn reflect<T: DeserializeOwned>() -> Result<Self> {
        Ok(Self::from_node(&shape::reflect::<T>()?))
    }

    /// Copy of this object with `adjust` applied to its body
    pub fn adjusting_body<F: FnOnce(&mut Body)>(&self, adjust: F) -> Self {
        let mut body = self.body.clone();
        adjust(&mut body);
        Self::new(self.ty.clone(), body)
    }
}

/// Append `node` and its descendants to `objects`, depth-first in field name order.
///
/// An object is skipped when an equal one is listed, or when its body is empty and an
/// object of the same type is listed. Recursion cut off by the cycle threshold leaves
/// such empty copies behind.
fn collect_objects(node: &DocumentationObject, objects: &mut Vec<Object>) {
    let object = Object::from_node(node);
    let listed = objects
        .iter()
        .any(|listed| *listed == object || (listed.ty == object.ty && object.body == Body::Empty));
    if !listed {
        objects.push(object);
    }
    if let Some(fields) = node.fields() {
        for child in fields.values() {
            collect_objects(child, objects);
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.body.is_empty() {
            return write!(f, "{}", self.ty);
        }
        writeln!(f, "{} {{", self.ty)?;
        match &self.body {
            Body::Fields(fields) => {
                let mut fields: Vec<&Field> = fields.iter().collect();
                fields.sort_by(|a, b| a.name.cmp(&b.name));
                for field in fields {
                    writeln!(f, "{}{}", INDENT, field)?;
                }
            }
            Body::Cases(cases) => {
                for case in cases {
                    writeln!(f, "{}- {}", INDENT, case)?;
                }
            }
            Body::Empty => {}
        }
        f.write_str("}")
    }
}

/// A media type such as `application/json; charset=utf-8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(rename = "type")]
    pub ty: String,
    pub subtype: String,
    pub parameters: BTreeMap<String, String>,
}

impl MediaType {
    pub fn new(ty: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            subtype: subtype.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn json() -> Self {
        Self::new("application", "json").with_parameter("charset", "utf-8")
    }

    pub fn plain_text() -> Self {
        Self::new("text", "plain").with_parameter("charset", "utf-8")
    }

    pub fn form_urlencoded() -> Self {
        Self::new("application", "x-www-form-urlencoded").with_parameter("charset", "utf-8")
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ty, self.subtype)?;
        for (key, value) in &self.parameters {
            write!(f, "; {}={}", key, value)?;
        }
        Ok(())
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let malformed = || Error::MalformedMediaType(input.to_string());
        let mut parts = input.split(';');
        let essence = parts.next().unwrap_or_default().trim();
        let (ty, subtype) = essence.split_once('/').ok_or_else(malformed)?;
        let valid = |part: &str| !part.is_empty() && !part.contains(char::is_whitespace);
        if !valid(ty) || !valid(subtype) {
            return Err(malformed());
        }

        let mut media_type = MediaType::new(ty.to_ascii_lowercase(), subtype.to_ascii_lowercase());
        for parameter in parts.map(str::trim).filter(|parameter| !parameter.is_empty()) {
            let (key, value) = parameter.split_once('=').ok_or_else(malformed)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(malformed());
            }
            media_type
                .parameters
                .insert(key.to_ascii_lowercase(), value.trim().trim_matches('"').to_string());
        }
        Ok(media_type)
    }
}

/// The objects exchanged in one direction of an endpoint, in a given media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub media_type: MediaType,
    pub objects: Vec<Object>,
}

impl Payload {
    pub fn new(media_type: MediaType, objects: Vec<Object>) -> Self {
        Self { media_type, objects }
    }

    /// Document `T` as exchanged in `media_type`
    pub fn reflect<T: DeserializeOwned>(media_type: MediaType) -> Result<Self> {
        Self::reflect_with::<T>(&Reflector::new(), media_type)
    }

    /// Like [`Payload::reflect`], with custom options and context values
    pub fn reflect_with<T: DeserializeOwned>(reflector: &Reflector, media_type: MediaType) -> Result<Self> {
        let documentation = reflector.reflect::<T>()?;
        Ok(Self::new(media_type, Object::objects_from(&documentation)))
    }

    /// Document `T` as JSON
    pub fn json<T: DeserializeOwned>() -> Result<Self> {
        Self::reflect::<T>(MediaType::json())
    }

    /// Document `T` as URL query parameters
    pub fn query<T: DeserializeOwned>() -> Result<Self> {
        Self::reflect::<T>(MediaType::form_urlencoded())
    }

    /// Keep the objects for which `keep` returns true
    pub fn filter_objects<F: FnMut(&Object) -> bool>(&self, mut keep: F) -> Self {
        Self::new(
            self.media_type.clone(),
            self.objects.iter().filter(|object| keep(*object)).cloned().collect(),
        )
    }

    /// Replace every object by the result of `map`, dropping those mapped to `None`
    pub fn filter_map_objects<F: FnMut(&Object) -> Option<Object>>(&self, map: F) -> Self {
        Self::new(self.media_type.clone(), self.objects.iter().filter_map(map).collect())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<{}>", self.media_type)?;
        for (index, object) in self.objects.iter().enumerate() {
            if index > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{}", object)?;
        }
        Ok(())
    }
}

/// Everything documented about one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDocumentation {
    /// Name of the group the endpoint is listed under
    pub group_name: Option<String>,
    pub method: HttpMethod,
    /// Route path without leading or trailing slashes
    pub path: String,
    /// Query parameters
    pub query: Option<Payload>,
    /// Request body
    pub request: Option<Payload>,
    /// Response body
    pub response: Option<Payload>,
    /// Authorization schemes the endpoint requires
    pub required_authorization: Vec<String>,
}

impl EndpointDocumentation {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            group_name: None,
            method,
            path: path.trim_matches('/').to_string(),
            query: None,
            request: None,
            response: None,
            required_authorization: Vec::new(),
        }
    }

    /// Empty documentation for the method and path of `route`
    pub fn for_route(route: &RouteInfo) -> Self {
        Self::new(route.method.clone(), &route.path)
    }

    pub fn grouped_as(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    pub fn with_query(mut self, query: Payload) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_request(mut self, request: Payload) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_response(mut self, response: Payload) -> Self {
        self.response = Some(response);
        self
    }

    pub fn requiring(mut self, authorization: impl Into<String>) -> Self {
        self.required_authorization.push(authorization.into());
        self
    }

    /// Method bucket followed by the path, e.g. `1GET/users`
    pub fn default_sort_order(&self) -> String {
        format!("{}/{}", self.method.sort_order(), self.path)
    }
}

impl fmt::Display for EndpointDocumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(group_name) = &self.group_name {
            writeln!(f, "[{}]", group_name)?;
        }
        write!(f, "{} {}", self.method, self.path)?;
        let sections = [
            ("Query", &self.query),
            ("Request", &self.request),
            ("Response", &self.response),
        ];
        for (title, payload) in sections {
            if let Some(payload) = payload {
                write!(f, "\n{}:\n{}", title, payload)?;
            }
        }
        if !self.required_authorization.is_empty() {
            write!(
                f,
                "\nRequired Authorization: {}",
                self.required_authorization.join(", ")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{register_named, register_wrapping, CustomDocumentationNamed, TypeWrapping};
    use crate::shape::COMPRESSED_SEQUENCE_KEY;
    use pretty_assertions::assert_eq;

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Owner {
        name: String,
        pets: Vec<Pet>,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Pet {
        nickname: Option<String>,
        name: String,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    enum Size {
        Small,
        Large,
        Medium,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Parcel {
        size: Size,
        weight: Option<Grams>,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Grams(u32);

    impl TypeWrapping for Grams {
        type Wrapped = u32;
    }

    impl CustomDocumentationNamed for Grams {
        fn documentation_name() -> String {
            "Weight in grams".to_string()
        }
    }

    fn field<T: ?Sized>(name: &str, is_optional: bool) -> Field {
        Field::new(name, DocumentationType::of::<T>(), is_optional)
    }

    #[test]
    fn test_objects_from_flattens_and_deduplicates() {
        let objects = Object::objects_from(&shape::reflect::<Owner>().unwrap());

        let expected = vec![
            Object::new(
                DocumentationType::of::<Owner>(),
                Body::Fields(vec![field::<String>("name", false), field::<Vec<Pet>>("pets", false)]),
            ),
            Object::new(DocumentationType::of::<String>(), Body::Empty),
            Object::new(
                DocumentationType::of::<Vec<Pet>>(),
                Body::Fields(vec![field::<Pet>(COMPRESSED_SEQUENCE_KEY, false)]),
            ),
            Object::new(
                DocumentationType::of::<Pet>(),
                Body::Fields(vec![field::<String>("name", false), field::<String>("nickname", true)]),
            ),
        ];
        assert_eq!(objects, expected);
    }

    #[test]
    fn test_cases_sorted_and_wrappers_resolved() {
        register_wrapping::<Grams>();
        register_named::<Grams>();

        let payload = Payload::json::<Parcel>().unwrap();
        let parcel = &payload.objects[0];
        assert_eq!(
            parcel.body,
            Body::Fields(vec![field::<Size>("size", false), field::<u32>("weight", true)])
        );

        let size = payload
            .objects
            .iter()
            .find(|object| object.ty == DocumentationType::of::<Size>())
            .unwrap();
        let values: Vec<&str> = match &size.body {
            Body::Cases(cases) => cases.iter().map(|case| case.value.as_str()).collect(),
            other => panic!("expected cases, got {:?}", other),
        };
        assert_eq!(values, vec!["Large", "Medium", "Small"]);
        assert!(payload.objects.iter().all(|object| object.ty.type_description != TypeIdentity::of::<Grams>()));
    }

    #[test]
    fn test_custom_name_is_preferred() {
        register_named::<Grams>();
        let ty = DocumentationType::of::<Grams>();
        assert_eq!(ty.default_name(), "Weight in grams");
        assert_eq!(ty.docs_name(), "Weight in grams");

        let plain = DocumentationType::of::<Pet>();
        assert_eq!(plain.docs_name(), "Pet");
        assert_eq!(plain.default_name(), "route_docs::documentation::tests::Pet");
    }

    #[test]
    fn test_body_wire_format() {
        let empty = serde_json::to_value(Body::Empty).unwrap();
        assert_eq!(
            empty,
            serde_json::json!({"isEmpty": true, "fields": null, "cases": null})
        );

        let cases = Body::Cases(vec![EnumCase::new(Some("Yes".to_string()), "y")]);
        assert_eq!(
            serde_json::to_value(&cases).unwrap(),
            serde_json::json!({"isEmpty": false, "fields": null, "cases": [{"name": "Yes", "value": "y"}]})
        );
    }

    #[test]
    fn test_body_round_trip() {
        let bodies = vec![
            Body::Empty,
            Body::Fields(vec![]),
            Body::Fields(vec![field::<u8>("count", false), field::<String>("label", true)]),
            Body::Cases(vec![EnumCase::new(None, "a"), EnumCase::new(Some("Bee".to_string()), "b")]),
        ];
        for body in bodies {
            let json = serde_json::to_string(&body).unwrap();
            let decoded: Body = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, body);
        }
    }

    #[test]
    fn test_body_decoding_priority() {
        let body: Body = serde_json::from_str(r#"{"isEmpty": true, "fields": [], "cases": []}"#).unwrap();
        assert_eq!(body, Body::Empty);

        let body: Body = serde_json::from_str(r#"{"isEmpty": false, "fields": [], "cases": []}"#).unwrap();
        assert_eq!(body, Body::Fields(vec![]));

        assert!(serde_json::from_str::<Body>(r#"{"isEmpty": false}"#).is_err());
    }

    #[test]
    fn test_filter_fields_and_adjusting_body() {
        let object = Object::new(
            DocumentationType::of::<Pet>(),
            Body::Fields(vec![field::<String>("name", false), field::<String>("nickname", true)]),
        );
        let adjusted = object.adjusting_body(|body| *body = body.filter_fields(&["nickname"]));
        assert_eq!(adjusted.body, Body::Fields(vec![field::<String>("name", false)]));
        assert_eq!(object.body.filter_fields(&[]), object.body);

        let cases = Body::Cases(vec![EnumCase::new(Some("Hidden".to_string()), "h"), EnumCase::new(None, "v")]);
        assert_eq!(cases.filter_fields(&["Hidden"]), Body::Cases(vec![EnumCase::new(None, "v")]));
    }

    #[test]
    fn test_filter_objects() {
        let payload = Payload::json::<Owner>().unwrap();
        let filtered = payload.filter_objects(|object| !object.body.is_empty());
        assert_eq!(filtered.objects.len(), 3);
        assert_eq!(filtered.media_type, payload.media_type);

        let renamed = payload.filter_map_objects(|object| {
            (object.ty == DocumentationType::of::<Pet>()).then(|| object.clone())
        });
        assert_eq!(renamed.objects.len(), 1);
    }

    #[test]
    fn test_media_type_parsing() {
        let media_type: MediaType = "Application/JSON; Charset=\"utf-8\"".parse().unwrap();
        assert_eq!(media_type, MediaType::json());
        assert_eq!(media_type.to_string(), "application/json; charset=utf-8");

        assert!("json".parse::<MediaType>().is_err());
        assert!("text/ plain".parse::<MediaType>().is_err());
        assert!("text/plain; charset".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_endpoint_documentation_builder() {
        let documentation = EndpointDocumentation::new(HttpMethod::Post, "/owners/")
            .grouped_as("Owners")
            .with_request(Payload::json::<Owner>().unwrap())
            .requiring("Bearer");

        assert_eq!(documentation.path, "owners");
        assert_eq!(documentation.default_sort_order(), "3POST/owners");

        let rendered = documentation.to_string();
        assert!(rendered.starts_with("[Owners]\nPOST owners\nRequest:\n<application/json; charset=utf-8>\n"));
        assert!(rendered.ends_with("Required Authorization: Bearer"));
    }

    #[test]
    fn test_object_display() {
        let object = Object::reflect::<Pet>().unwrap();
        assert_eq!(
            object.to_string(),
            "route_docs::documentation::tests::Pet {\n   name: alloc::string::String\n   nickname: alloc::string::String?\n}"
        );
        assert_eq!(
            Object::new(DocumentationType::of::<u8>(), Body::Empty).to_string(),
            "u8"
        );
    }
}
