//! Shape decoder engine.
//!
//! Recovers the structure of a type by running its `Deserialize` implementation against a
//! synthetic data source that answers every request with a placeholder value. The requests
//! themselves (field names, nested value types, sequences, maps, enum variants) are recorded
//! into a tree of [`DocumentationObject`]s. Self-describing requests carry no shape of
//! their own and are answered by trial, refined by the errors the type reports.
//!
//! # Example
//!
//! ```
//! use route_docs::shape::{reflect, ShapeBody};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     nickname: Option<String>,
//! }
//!
//! let documentation = reflect::<User>().unwrap();
//! let fields = documentation.fields().unwrap();
//! assert!(fields["nickname"].is_optional());
//! assert_eq!(fields["id"].body(), &ShapeBody::None);
//! ```

mod cache;
mod context;
mod decoder;
mod hint;

pub use cache::{cached_type_count, clear_cache};
pub use context::{context_value, is_documentation_decoding};

use crate::error::Result;
use crate::registry;
use crate::type_identity::{NameOptions, TypeIdentity};
use crate::wrapping;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// How many times a `(key, type)` pair may repeat along one coding path before the
/// engine treats further descent as a cycle
pub const DEFAULT_CYCLE_THRESHOLD: usize = 3;

/// How many elements are requested from an open-ended sequence
pub const DEFAULT_MAX_SEQUENCE_LEN: usize = 10;

/// Field name under which map values are recorded
pub const ANY_KEY: &str = "{any}";

/// Field name replacing the indices of a sequence whose elements all share one shape
pub const COMPRESSED_SEQUENCE_KEY: &str = "{0...}";

/// Opaque handle of a concrete runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle {
    name: &'static str,
}

impl TypeHandle {
    pub fn of<T: ?Sized>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Structured identity of the type
    pub fn identity(&self) -> TypeIdentity {
        TypeIdentity::parse_lossy(self.name)
    }

    pub fn is_optional(&self) -> bool {
        self.identity().is_optional()
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A single case of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumCase {
    /// Human readable name, when one was declared
    pub name: Option<String>,
    /// The raw value as it appears on the wire
    pub value: String,
}

impl EnumCase {
    pub fn new(name: Option<String>, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// What is known about the inside of a documented type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ShapeBody {
    /// A scalar or an opaque value
    #[default]
    None,
    Fields(BTreeMap<String, DocumentationObject>),
    Cases(Vec<EnumCase>),
}

/// Node of a decoded shape tree.
///
/// Once a node carries enum cases it never goes back to holding fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentationObject {
    ty: TypeHandle,
    body: ShapeBody,
}

impl DocumentationObject {
    pub fn new(ty: TypeHandle) -> Self {
        Self::with_body(ty, ShapeBody::None)
    }

    pub fn of<T: ?Sized>() -> Self {
        Self::new(TypeHandle::of::<T>())
    }

    pub fn with_body(ty: TypeHandle, body: ShapeBody) -> Self {
        Self { ty, body }
    }

    /// Builder-style [`DocumentationObject::set_field`]
    pub fn field(mut self, name: impl Into<String>, child: DocumentationObject) -> Self {
        self.set_field(name, child);
        self
    }

    /// Builder-style [`DocumentationObject::set_cases`]
    pub fn cases(mut self, cases: Vec<EnumCase>) -> Self {
        self.set_cases(cases);
        self
    }

    pub fn ty(&self) -> TypeHandle {
        self.ty
    }

    pub fn body(&self) -> &ShapeBody {
        &self.body
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, DocumentationObject>> {
        match &self.body {
            ShapeBody::Fields(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.ty.is_optional()
    }

    /// Record `child` under `name`. Returns `false` without changing anything when this
    /// node already describes an enumeration.
    pub fn set_field(&mut self, name: impl Into<String>, child: DocumentationObject) -> bool {
        let name = name.into();
        if let ShapeBody::Cases(_) = self.body {
            warn!("Ignoring field '{}' recorded on enum type {}", name, self.ty);
            return false;
        }
        if let ShapeBody::None = self.body {
            self.body = ShapeBody::Fields(BTreeMap::new());
        }
        if let ShapeBody::Fields(fields) = &mut self.body {
            fields.insert(name, child);
        }
        true
    }

    pub fn set_cases(&mut self, cases: Vec<EnumCase>) {
        self.body = ShapeBody::Cases(cases);
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut DocumentationObject> {
        match &mut self.body {
            ShapeBody::Fields(fields) => fields.get_mut(name),
            _ => None,
        }
    }

    /// Collapse the fields `"0"..count` into a single [`COMPRESSED_SEQUENCE_KEY`] field
    /// when every element has the same shape.
    pub(crate) fn compress_elements(&mut self, count: usize) -> bool {
        let Some(fields) = self.fields() else {
            return false;
        };
        if count == 0 || fields.len() != count {
            return false;
        }
        let Some(first) = fields.get("0") else {
            return false;
        };
        let uniform = (1..count).all(|index| fields.get(&index.to_string()) == Some(first));
        if !uniform {
            return false;
        }

        let element = first.clone();
        debug!("Compressing {} identical elements of {}", count, self.ty);
        self.body = ShapeBody::Fields(BTreeMap::from([(
            COMPRESSED_SEQUENCE_KEY.to_string(),
            element,
        )]));
        true
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{}", self.ty.identity().type_name(NameOptions::PARENTS))?;
        match &self.body {
            ShapeBody::None => Ok(()),
            ShapeBody::Cases(cases) => {
                let values: Vec<&str> = cases.iter().map(|case| case.value.as_str()).collect();
                write!(f, " = {}", values.join(" | "))
            }
            ShapeBody::Fields(fields) => {
                let indent = "  ".repeat(depth);
                writeln!(f, " {{")?;
                for (name, child) in fields {
                    write!(f, "{}  {}: ", indent, name)?;
                    child.fmt_indented(f, depth + 1)?;
                    writeln!(f)?;
                }
                write!(f, "{}}}", indent)
            }
        }
    }
}

impl fmt::Display for DocumentationObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Bounds applied while walking a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReflectOptions {
    pub cycle_threshold: usize,
    pub max_sequence_len: usize,
}

impl Default for ReflectOptions {
    fn default() -> Self {
        Self {
            cycle_threshold: DEFAULT_CYCLE_THRESHOLD,
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
        }
    }
}

/// Configurable entry point of the engine.
///
/// Context values are visible to `Deserialize` implementations through [`context_value`]
/// while a shape is being walked. They do not take part in caching.
#[derive(Debug, Clone, Default)]
pub struct Reflector {
    options: ReflectOptions,
    context: BTreeMap<String, Value>,
}

impl Reflector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ReflectOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_context_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn options(&self) -> &ReflectOptions {
        &self.options
    }

    /// Decode the shape of `T`, reusing a cached result when one exists
    pub fn reflect<T: DeserializeOwned>(&self) -> Result<DocumentationObject> {
        let ty = TypeHandle::of::<T>();
        if let Some(entry) = cache::lookup(ty, &self.options) {
            debug!("Using cached shape of {}", ty);
            return Ok(entry.documentation);
        }

        let _context = context::enter(self.context.clone());
        let (documentation, sample) = match custom_documentation(ty) {
            Some(custom) => {
                debug!("Using custom documentation of {}", ty);
                let sample = match custom.placeholder {
                    Some(placeholder) => placeholder,
                    // Containers replay this sample later, so it must be one `T` accepts
                    None => decoder::walk::<T>(ty, self.options, true)?.1,
                };
                (DocumentationObject::with_body(ty, custom.body), sample)
            }
            None => {
                debug!("Decoding shape of {}", ty);
                decoder::walk::<T>(ty, self.options, false)?
            }
        };

        cache::insert(
            ty,
            self.options,
            cache::CacheEntry {
                sample,
                documentation: documentation.clone(),
            },
        );
        Ok(documentation)
    }
}

/// Decode the shape of `T` with default options
pub fn reflect<T: DeserializeOwned>() -> Result<DocumentationObject> {
    Reflector::new().reflect::<T>()
}

/// Registered custom documentation of a type, looking through optional and pointer layers
fn custom_documentation(ty: TypeHandle) -> Option<registry::CustomDocumentation> {
    registry::custom_documentation(&wrapping::strip_transparent(&ty.identity()))
}
