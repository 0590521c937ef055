//! Route Docs - API documentation from the shape of request and response types.
//!
//! Instead of parsing source code, this library runs a type's own `serde::Deserialize`
//! implementation against a synthetic data source and records what it asks for: field
//! names, nested types, optionality, sequences, maps and enum cases. The recovered shape
//! is turned into a flat list of documented objects per payload and attached to routes.
//!
//! # Architecture
//!
//! 1. [`type_identity`] - Parses fully qualified type names into structured identities
//! 2. [`registry`] - Opt-in documentation capabilities of individual types
//! 3. [`wrapping`] - Reduces wrapper types to the type they stand for
//! 4. [`shape`] - Walks the shape of a type through its `Deserialize` implementation
//! 5. [`documentation`] - Converts shapes into the public documentation model
//! 6. [`route`] - Attaches documentation to routes
//! 7. [`docs_context`] - Groups and sorts documented endpoints for renderers
//! 8. [`serializer`] - Serializes documentation to YAML or JSON
//!
//! # Example Usage
//!
//! ```
//! use route_docs::{
//!     docs_context::DocsViewContext,
//!     documentation::{EndpointDocumentation, Payload},
//!     route::{HttpMethod, RouteInfo},
//!     serializer::serialize_yaml,
//! };
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct CreateUser {
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! let route = RouteInfo::new("/users", HttpMethod::Post, "create_user").documented(
//!     EndpointDocumentation::new(HttpMethod::Post, "/users")
//!         .grouped_as("Users")
//!         .with_request(Payload::json::<CreateUser>().unwrap()),
//! );
//!
//! let context = DocsViewContext::from_routes(&[route]);
//! let yaml = serialize_yaml(&context).unwrap();
//! assert!(yaml.contains("groupName: Users"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod demo;
pub mod docs_context;
pub mod documentation;
pub mod error;
pub mod registry;
pub mod route;
pub mod serializer;
pub mod shape;
pub mod type_identity;
pub mod wrapping;
