//! Routes and the documentation attached to them.
//!
//! Web frameworks keep their own route types. To take part in documentation a route only
//! needs to store arbitrary values under string keys ([`Extendable`]); the
//! [`EndpointDocumentable`] and [`DocumentationAttachable`] capabilities are then provided
//! for it automatically.
//!
//! # Example
//!
//! ```
//! use route_docs::documentation::EndpointDocumentation;
//! use route_docs::route::{DocumentationAttachable, EndpointDocumentable, HttpMethod, RouteInfo};
//!
//! let mut route = RouteInfo::new("/users", HttpMethod::Get, "list_users");
//! let documentation = EndpointDocumentation::for_route(&route).grouped_as("Users");
//! route.add_documentation(documentation);
//!
//! assert_eq!(route.documentation().unwrap().group_name.as_deref(), Some("Users"));
//! ```

use crate::documentation::EndpointDocumentation;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Attachment key under which endpoint documentation is stored
pub const DOCUMENTATION_KEY: &str = "endpoint_documentation";

/// HTTP methods of documented routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
    /// HTTP HEAD method
    Head,
    /// Any other method, kept verbatim
    Other(String),
}

impl HttpMethod {
    /// Method for a case-insensitive name; unknown names are kept verbatim
    pub fn from_name(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "PATCH" => HttpMethod::Patch,
            "OPTIONS" => HttpMethod::Options,
            "HEAD" => HttpMethod::Head,
            _ => HttpMethod::Other(method.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Other(method) => method,
        }
    }

    /// Key ordering GET, PUT, POST and DELETE first, in that order; all other methods
    /// follow by name
    pub fn sort_order(&self) -> String {
        match self {
            HttpMethod::Get => "1GET".to_string(),
            HttpMethod::Put => "2PUT".to_string(),
            HttpMethod::Post => "3POST".to_string(),
            HttpMethod::Delete => "4DELETE".to_string(),
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = std::convert::Infallible;

    fn from_str(method: &str) -> Result<Self, Self::Err> {
        Ok(HttpMethod::from_name(method))
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let method = String::deserialize(deserializer)?;
        Ok(HttpMethod::from_name(&method))
    }
}

/// Storage of arbitrary values under string keys.
pub trait Extendable {
    fn attachment(&self, key: &str) -> Option<&(dyn Any + Send + Sync)>;

    fn set_attachment(&mut self, key: &str, value: Box<dyn Any + Send + Sync>);
}

/// Read access to the documentation of a route.
pub trait EndpointDocumentable {
    fn documentation(&self) -> Option<&EndpointDocumentation>;
}

/// Write access to the documentation of a route.
pub trait DocumentationAttachable {
    fn add_documentation(&mut self, documentation: EndpointDocumentation);
}

impl<T: Extendable + ?Sized> EndpointDocumentable for T {
    fn documentation(&self) -> Option<&EndpointDocumentation> {
        self.attachment(DOCUMENTATION_KEY)?.downcast_ref()
    }
}

impl<T: Extendable + ?Sized> DocumentationAttachable for T {
    fn add_documentation(&mut self, documentation: EndpointDocumentation) {
        debug!(
            "Attaching documentation to {} {}",
            documentation.method, documentation.path
        );
        self.set_attachment(DOCUMENTATION_KEY, Box::new(documentation));
    }
}

/// A registered route.
pub struct RouteInfo {
    /// The URL path pattern (e.g., "/users/:id")
    pub path: String,
    /// The HTTP method for this route
    pub method: HttpMethod,
    /// The name of the handler function
    pub handler_name: String,
    /// Values attached by other components
    user_info: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl RouteInfo {
    /// Create a new route without attachments
    pub fn new(path: impl Into<String>, method: HttpMethod, handler_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            handler_name: handler_name.into(),
            user_info: HashMap::new(),
        }
    }

    /// Builder-style [`DocumentationAttachable::add_documentation`]
    pub fn documented(mut self, documentation: EndpointDocumentation) -> Self {
        self.add_documentation(documentation);
        self
    }
}

impl Extendable for RouteInfo {
    fn attachment(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.user_info.get(key).map(|value| value.as_ref())
    }

    fn set_attachment(&mut self, key: &str, value: Box<dyn Any + Send + Sync>) {
        self.user_info.insert(key.to_string(), value);
    }
}

impl fmt::Debug for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.user_info.keys().collect();
        keys.sort();
        f.debug_struct("RouteInfo")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("handler_name", &self.handler_name)
            .field("user_info", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert_eq!(
            "PROPFIND".parse::<HttpMethod>().unwrap(),
            HttpMethod::Other("PROPFIND".to_string())
        );
    }

    #[test]
    fn test_method_sort_order() {
        let mut methods = vec![
            HttpMethod::Patch,
            HttpMethod::Delete,
            HttpMethod::Post,
            HttpMethod::Get,
            HttpMethod::Put,
        ];
        methods.sort_by_key(HttpMethod::sort_order);
        assert_eq!(
            methods,
            vec![
                HttpMethod::Get,
                HttpMethod::Put,
                HttpMethod::Post,
                HttpMethod::Delete,
                HttpMethod::Patch,
            ]
        );
    }

    #[test]
    fn test_method_serializes_as_string() {
        assert_eq!(serde_json::to_string(&HttpMethod::Post).unwrap(), "\"POST\"");
        let method: HttpMethod = serde_json::from_str("\"LINK\"").unwrap();
        assert_eq!(method, HttpMethod::Other("LINK".to_string()));
    }

    #[test]
    fn test_route_without_documentation() {
        let route = RouteInfo::new("/health", HttpMethod::Get, "health");
        assert!(route.documentation().is_none());
    }

    #[test]
    fn test_attach_and_replace_documentation() {
        let mut route = RouteInfo::new("/users/:id", HttpMethod::Delete, "delete_user");
        route.add_documentation(EndpointDocumentation::for_route(&route));
        route.add_documentation(EndpointDocumentation::for_route(&route).grouped_as("Users"));

        let documentation = route.documentation().unwrap();
        assert_eq!(documentation.method, HttpMethod::Delete);
        assert_eq!(documentation.path, "users/:id");
        assert_eq!(documentation.group_name.as_deref(), Some("Users"));
    }

    #[test]
    fn test_foreign_attachments_are_ignored() {
        let mut route = RouteInfo::new("/", HttpMethod::Get, "index");
        route.set_attachment(DOCUMENTATION_KEY, Box::new("not documentation"));
        assert!(route.documentation().is_none());
        assert!(format!("{:?}", route).contains(DOCUMENTATION_KEY));
    }
}
