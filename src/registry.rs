//! Opt-in documentation capabilities of individual types.
//!
//! Rust has no runtime conformance checks, so types declare their capabilities by
//! implementing one of the traits below and registering themselves once:
//!
//! ```
//! use route_docs::registry::{register_named, CustomDocumentationNamed};
//! use route_docs::type_identity::TypeIdentity;
//!
//! struct UserId(u64);
//!
//! impl CustomDocumentationNamed for UserId {
//!     fn documentation_name() -> String {
//!         "User ID".to_string()
//!     }
//! }
//!
//! register_named::<UserId>();
//! let name = route_docs::registry::custom_name(&TypeIdentity::of::<UserId>());
//! assert_eq!(name.as_deref(), Some("User ID"));
//! ```
//!
//! A handful of standard library types (and `chrono`/`uuid` types behind the features of
//! the same name) are registered out of the box.

use crate::shape::{EnumCase, ShapeBody};
use crate::type_identity::TypeIdentity;
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A type that documents itself instead of having its shape decoded.
pub trait CustomDocumentable {
    /// Body reported for the type
    fn documentation_body() -> ShapeBody {
        ShapeBody::None
    }

    /// Value fed to the type's `Deserialize` implementation when an instance is needed.
    ///
    /// Without one the type is decoded from synthetic data without being recorded.
    fn documentation_placeholder() -> Option<Value> {
        None
    }
}

/// An enumeration listing its cases with readable names.
pub trait DocumentedCases {
    fn documentation_cases() -> Vec<EnumCase>;

    fn documentation_placeholder() -> Option<Value> {
        None
    }
}

/// A type that is documented as the type it wraps.
pub trait TypeWrapping {
    type Wrapped: ?Sized;
}

/// A type with a display name of its own.
pub trait CustomDocumentationNamed {
    fn documentation_name() -> String;
}

/// Body and placeholder declared by a [`CustomDocumentable`] or [`DocumentedCases`] type
#[derive(Debug, Clone, PartialEq)]
pub struct CustomDocumentation {
    pub body: ShapeBody,
    pub placeholder: Option<Value>,
}

/// Everything registered for one type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capabilities {
    pub documentation: Option<CustomDocumentation>,
    pub wrapped: Option<TypeIdentity>,
    pub name: Option<String>,
}

struct TypeRegistry {
    entries: HashMap<TypeIdentity, Capabilities>,
}

impl TypeRegistry {
    fn with_builtins() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
        };
        registry.add_documentable::<std::net::IpAddr>();
        registry.add_documentable::<std::net::Ipv4Addr>();
        registry.add_documentable::<std::net::Ipv6Addr>();
        registry.add_documentable::<std::net::SocketAddr>();
        registry.add_documentable::<std::net::SocketAddrV4>();
        registry.add_documentable::<std::net::SocketAddrV6>();
        #[cfg(feature = "chrono")]
        {
            registry.add_documentable::<chrono::DateTime<chrono::Utc>>();
            registry.add_documentable::<chrono::DateTime<chrono::FixedOffset>>();
            registry.add_documentable::<chrono::NaiveDate>();
            registry.add_documentable::<chrono::NaiveDateTime>();
            registry.add_documentable::<chrono::NaiveTime>();
        }
        #[cfg(feature = "uuid")]
        registry.add_documentable::<uuid::Uuid>();
        registry
    }

    fn entry<T: ?Sized>(&mut self) -> &mut Capabilities {
        self.entries.entry(TypeIdentity::of::<T>()).or_default()
    }

    fn add_documentable<T: CustomDocumentable + ?Sized>(&mut self) {
        self.entry::<T>().documentation = Some(CustomDocumentation {
            body: T::documentation_body(),
            placeholder: T::documentation_placeholder(),
        });
    }
}

static REGISTRY: OnceLock<RwLock<TypeRegistry>> = OnceLock::new();

fn registry() -> &'static RwLock<TypeRegistry> {
    REGISTRY.get_or_init(|| RwLock::new(TypeRegistry::with_builtins()))
}

fn read() -> RwLockReadGuard<'static, TypeRegistry> {
    match registry().read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Type registry lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

fn write() -> RwLockWriteGuard<'static, TypeRegistry> {
    match registry().write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Type registry lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Register `T` as documenting itself
pub fn register_documentable<T: CustomDocumentable + ?Sized>() {
    debug!("Registering custom documentation for {}", std::any::type_name::<T>());
    write().add_documentable::<T>();
}

/// Register the declared cases of `T` as its documentation body
pub fn register_cases<T: DocumentedCases + ?Sized>() {
    debug!("Registering documented cases for {}", std::any::type_name::<T>());
    write().entry::<T>().documentation = Some(CustomDocumentation {
        body: ShapeBody::Cases(T::documentation_cases()),
        placeholder: T::documentation_placeholder(),
    });
}

/// Register `T` as a transparent wrapper of `T::Wrapped`
pub fn register_wrapping<T: TypeWrapping + ?Sized>() {
    debug!(
        "Registering {} as wrapping {}",
        std::any::type_name::<T>(),
        std::any::type_name::<T::Wrapped>()
    );
    write().entry::<T>().wrapped = Some(TypeIdentity::of::<T::Wrapped>());
}

/// Register the display name of `T`
pub fn register_named<T: CustomDocumentationNamed + ?Sized>() {
    debug!("Registering documentation name for {}", std::any::type_name::<T>());
    write().entry::<T>().name = Some(T::documentation_name());
}

/// Everything registered for a type
pub fn capabilities(identity: &TypeIdentity) -> Option<Capabilities> {
    read().entries.get(identity).cloned()
}

pub fn custom_documentation(identity: &TypeIdentity) -> Option<CustomDocumentation> {
    read()
        .entries
        .get(identity)
        .and_then(|capabilities| capabilities.documentation.clone())
}

pub fn wrapped_type(identity: &TypeIdentity) -> Option<TypeIdentity> {
    read()
        .entries
        .get(identity)
        .and_then(|capabilities| capabilities.wrapped.clone())
}

pub fn custom_name(identity: &TypeIdentity) -> Option<String> {
    read()
        .entries
        .get(identity)
        .and_then(|capabilities| capabilities.name.clone())
}

fn placeholder(text: &str) -> Option<Value> {
    Some(Value::from(text))
}

impl CustomDocumentable for std::net::IpAddr {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("0.0.0.0")
    }
}

impl CustomDocumentable for std::net::Ipv4Addr {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("0.0.0.0")
    }
}

impl CustomDocumentable for std::net::Ipv6Addr {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("::")
    }
}

impl CustomDocumentable for std::net::SocketAddr {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("0.0.0.0:0")
    }
}

impl CustomDocumentable for std::net::SocketAddrV4 {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("0.0.0.0:0")
    }
}

impl CustomDocumentable for std::net::SocketAddrV6 {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("[::]:0")
    }
}

#[cfg(feature = "chrono")]
impl CustomDocumentable for chrono::DateTime<chrono::Utc> {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("1970-01-01T00:00:00Z")
    }
}

#[cfg(feature = "chrono")]
impl CustomDocumentable for chrono::DateTime<chrono::FixedOffset> {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("1970-01-01T00:00:00+00:00")
    }
}

#[cfg(feature = "chrono")]
impl CustomDocumentable for chrono::NaiveDate {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("1970-01-01")
    }
}

#[cfg(feature = "chrono")]
impl CustomDocumentable for chrono::NaiveDateTime {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("1970-01-01T00:00:00")
    }
}

#[cfg(feature = "chrono")]
impl CustomDocumentable for chrono::NaiveTime {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("00:00:00")
    }
}

#[cfg(feature = "uuid")]
impl CustomDocumentable for uuid::Uuid {
    fn documentation_placeholder() -> Option<Value> {
        placeholder("00000000-0000-0000-0000-000000000000")
    }
}
