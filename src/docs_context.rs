//! Aggregates endpoint documentation into the context handed to renderers.

use crate::documentation::{
    serialize_body_parts, Body, DocumentationType, EndpointDocumentation, Field, MediaType, Object,
    Payload,
};
use crate::route::{EndpointDocumentable, HttpMethod, RouteInfo};
use crate::shape::EnumCase;
use crate::type_identity::NameOptions;
use log::debug;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Computes the display name of a type that has no custom name
pub type Naming<'a> = &'a dyn Fn(&DocumentationType) -> String;

/// Everything a documentation page needs, grouped and sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsViewContext {
    /// Named groups in group name order
    pub grouped_documentations: Vec<GroupedDocumentation>,
    /// Endpoints without a group
    pub other_documentations: Vec<DocumentationView>,
}

/// Endpoints sharing a group name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedDocumentation {
    /// Position of the group in group name order
    pub id: usize,
    pub group_name: String,
    pub documentations: Vec<DocumentationView>,
}

/// Display form of one endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationView {
    pub method: HttpMethod,
    pub path: String,
    pub query: Option<PayloadView>,
    pub request: Option<PayloadView>,
    pub response: Option<PayloadView>,
    pub required_authorization: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadView {
    pub media_type: MediaType,
    pub objects: Vec<ObjectView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectView {
    pub name: String,
    pub body: BodyView,
}

/// Display form of a [`Body`]; `isEmpty` also holds for bodies without fields or cases
#[derive(Debug, Clone, PartialEq)]
pub enum BodyView {
    Empty,
    Fields(Vec<FieldView>),
    Cases(Vec<EnumCase>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub is_optional: bool,
}

impl Serialize for BodyView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BodyView::Empty => serialize_body_parts::<_, FieldView, EnumCase>(serializer, true, None, None),
            BodyView::Fields(fields) => serialize_body_parts::<_, _, EnumCase>(
                serializer,
                fields.is_empty(),
                Some(fields.as_slice()),
                None,
            ),
            BodyView::Cases(cases) => serialize_body_parts::<_, FieldView, _>(
                serializer,
                cases.is_empty(),
                None,
                Some(cases.as_slice()),
            ),
        }
    }
}

fn view_name(ty: &DocumentationType, naming: Option<Naming<'_>>) -> String {
    ty.custom_name
        .clone()
        .or_else(|| naming.map(|naming| naming(ty)))
        .unwrap_or_else(|| ty.type_description.type_name(NameOptions::PARENTS))
}

impl FieldView {
    fn new(field: &Field, naming: Option<Naming<'_>>) -> Self {
        Self {
            name: field.name.clone(),
            ty: view_name(&field.ty, naming),
            is_optional: field.is_optional,
        }
    }
}

impl BodyView {
    fn new(body: &Body, naming: Option<Naming<'_>>) -> Self {
        match body {
            Body::Empty => BodyView::Empty,
            Body::Fields(fields) => {
                BodyView::Fields(fields.iter().map(|field| FieldView::new(field, naming)).collect())
            }
            Body::Cases(cases) => BodyView::Cases(cases.clone()),
        }
    }
}

impl ObjectView {
    fn new(object: &Object, naming: Option<Naming<'_>>) -> Self {
        Self {
            name: view_name(&object.ty, naming),
            body: BodyView::new(&object.body, naming),
        }
    }
}

impl PayloadView {
    fn new(payload: &Payload, naming: Option<Naming<'_>>) -> Self {
        Self {
            media_type: payload.media_type.clone(),
            objects: payload.objects.iter().map(|object| ObjectView::new(object, naming)).collect(),
        }
    }
}

impl DocumentationView {
    fn new(documentation: &EndpointDocumentation, naming: Option<Naming<'_>>) -> Self {
        let payload = |payload: &Option<Payload>| payload.as_ref().map(|payload| PayloadView::new(payload, naming));
        Self {
            method: documentation.method.clone(),
            path: documentation.path.clone(),
            query: payload(&documentation.query),
            request: payload(&documentation.request),
            response: payload(&documentation.response),
            required_authorization: documentation.required_authorization.clone(),
        }
    }
}

fn sorted_views<K, F>(
    mut documentations: Vec<&EndpointDocumentation>,
    sort_key: &F,
    naming: Option<Naming<'_>>,
) -> Vec<DocumentationView>
where
    K: Ord,
    F: Fn(&EndpointDocumentation) -> K,
{
    documentations.sort_by_key(|documentation| sort_key(*documentation));
    documentations
        .into_iter()
        .map(|documentation| DocumentationView::new(documentation, naming))
        .collect()
}

impl DocsViewContext {
    /// Group `documentations` by group name and sort every group by `sort_key`.
    ///
    /// Type names are the registered custom name, else the result of `naming`, else the
    /// type name with its parents but without its module.
    pub fn build<'a, I, K, F>(documentations: I, sort_key: F, naming: Option<Naming<'_>>) -> Self
    where
        I: IntoIterator<Item = &'a EndpointDocumentation>,
        K: Ord,
        F: Fn(&EndpointDocumentation) -> K,
    {
        let mut groups: BTreeMap<&str, Vec<&EndpointDocumentation>> = BTreeMap::new();
        let mut others = Vec::new();
        for documentation in documentations {
            match &documentation.group_name {
                Some(group_name) => groups.entry(group_name.as_str()).or_default().push(documentation),
                None => others.push(documentation),
            }
        }
        debug!(
            "Building docs context with {} groups and {} ungrouped endpoints",
            groups.len(),
            others.len()
        );

        let grouped_documentations = groups
            .into_iter()
            .enumerate()
            .map(|(id, (group_name, documentations))| GroupedDocumentation {
                id,
                group_name: group_name.to_string(),
                documentations: sorted_views(documentations, &sort_key, naming),
            })
            .collect();

        Self {
            grouped_documentations,
            other_documentations: sorted_views(others, &sort_key, naming),
        }
    }

    /// Context of every documented item, in default order with default naming
    pub fn new<'a, I, D>(documentables: I) -> Self
    where
        I: IntoIterator<Item = &'a D>,
        D: EndpointDocumentable + ?Sized + 'a,
    {
        let documentations: Vec<&EndpointDocumentation> = documentables
            .into_iter()
            .filter_map(|documentable| documentable.documentation())
            .collect();
        Self::build(documentations, EndpointDocumentation::default_sort_order, None)
    }

    pub fn from_routes(routes: &[RouteInfo]) -> Self {
        Self::new(routes)
    }
}
