//! A small pet store API used by the `demo` command.

use crate::documentation::{EndpointDocumentation, Payload};
use crate::error::Result;
use crate::registry::{
    register_cases, register_named, register_wrapping, CustomDocumentationNamed, DocumentedCases,
    TypeWrapping,
};
use crate::route::{HttpMethod, RouteInfo};
use crate::shape::EnumCase;
use serde::Deserialize;
use std::sync::Once;

const PETS: &str = "Pets";
const CATEGORIES: &str = "Categories";
const BEARER: &str = "Bearer";

#[derive(Debug, Deserialize)]
pub struct PetId(pub u64);

impl CustomDocumentationNamed for PetId {
    fn documentation_name() -> String {
        "Pet ID".to_string()
    }
}

/// Weight of a pet
#[derive(Debug, Deserialize)]
pub struct Kilograms(pub f32);

impl TypeWrapping for Kilograms {
    type Wrapped = f32;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Sold,
}

impl DocumentedCases for PetStatus {
    fn documentation_cases() -> Vec<EnumCase> {
        vec![
            EnumCase::new(Some("Available for adoption".to_string()), "available"),
            EnumCase::new(Some("Adoption pending".to_string()), "pending"),
            EnumCase::new(Some("Adopted".to_string()), "sold"),
        ]
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub parent: Option<Box<Category>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub status: PetStatus,
    pub category: Option<Category>,
    pub tags: Vec<String>,
    pub weight: Option<Kilograms>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    pub name: String,
    pub status: PetStatus,
    pub category_id: Option<u64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PetQuery {
    pub status: Option<PetStatus>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct Health {
    pub ok: bool,
    pub version: String,
}

static REGISTER: Once = Once::new();

/// Register the documentation capabilities of the demo types
pub fn register() {
    REGISTER.call_once(|| {
        register_cases::<PetStatus>();
        register_named::<PetId>();
        register_wrapping::<Kilograms>();
    });
}

/// The documented routes of the pet store
pub fn routes() -> Result<Vec<RouteInfo>> {
    register();

    let pets = |method: HttpMethod, path: &str| EndpointDocumentation::new(method, path).grouped_as(PETS);

    Ok(vec![
        RouteInfo::new("/pets", HttpMethod::Get, "list_pets").documented(
            pets(HttpMethod::Get, "/pets")
                .with_query(Payload::query::<PetQuery>()?)
                .with_response(Payload::json::<Vec<Pet>>()?),
        ),
        RouteInfo::new("/pets", HttpMethod::Post, "create_pet").documented(
            pets(HttpMethod::Post, "/pets")
                .with_request(Payload::json::<NewPet>()?)
                .with_response(Payload::json::<Pet>()?)
                .requiring(BEARER),
        ),
        RouteInfo::new("/pets/:id", HttpMethod::Get, "get_pet")
            .documented(pets(HttpMethod::Get, "/pets/:id").with_response(Payload::json::<Pet>()?)),
        RouteInfo::new("/pets/:id", HttpMethod::Delete, "delete_pet")
            .documented(pets(HttpMethod::Delete, "/pets/:id").requiring(BEARER)),
        RouteInfo::new("/categories", HttpMethod::Get, "list_categories").documented(
            EndpointDocumentation::new(HttpMethod::Get, "/categories")
                .grouped_as(CATEGORIES)
                .with_response(Payload::json::<Vec<Category>>()?),
        ),
        RouteInfo::new("/health", HttpMethod::Get, "health").documented(
            EndpointDocumentation::new(HttpMethod::Get, "/health")
                .with_response(Payload::json::<Health>()?),
        ),
        RouteInfo::new("/metrics", HttpMethod::Get, "metrics"),
    ])
}
