//! Structured type identities parsed from fully-qualified type names.
//!
//! Two spellings are understood:
//!
//! - Rust paths as produced by [`std::any::type_name`], e.g.
//!   `alloc::vec::Vec<my_api::User>` or `[u8; 4]`
//! - the dotted canonical format `Module.Outer.Inner<G1, G2>`, optionally prefixed with
//!   an extension marker `(extension in Module):Owning.Type<...>`
//!
//! # Example
//!
//! ```
//! use route_docs::type_identity::{NameOptions, TypeIdentity};
//!
//! let identity = TypeIdentity::parse("alloc::vec::Vec<my_api::User>");
//! assert_eq!(identity.module, "alloc::vec");
//! assert_eq!(identity.name, "Vec");
//! assert_eq!(identity.type_name(NameOptions::NONE), "Vec<User>");
//! ```

use crate::error::{Error, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Module holding primitives and names that carry no module of their own
pub const ROOT_MODULE: &str = "core";

/// Name of the synthetic type describing integer literal generic parameters
pub const INTEGER_LITERAL_TYPE: &str = "usize";

const EXTENSION_PREFIX: &str = "(extension in ";
const UNKNOWN_CONTEXT_PREFIX: &str = "(unknown context";
const RESERVED_NAMES: &[&str] = &["Any", "Void"];
/// Module of the dotted format whose `Any` and `Void` are the reserved root names
const STANDARD_MODULE: &str = "Swift";
const SEGMENT_TERMINATORS: &[char] = &[
    '.', '<', '>', ',', ':', ';', '(', ')', '[', ']', ' ', '+', '&',
];

/// How the module of an identity is joined to its name when rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStyle {
    /// `Module.Name`
    #[default]
    Dotted,
    /// `module::path::Name`
    Rust,
}

impl PathStyle {
    fn separator(self) -> &'static str {
        match self {
            PathStyle::Dotted => ".",
            PathStyle::Rust => "::",
        }
    }

    fn is_dotted(&self) -> bool {
        *self == PathStyle::Dotted
    }
}

/// A structured, comparable type identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TypeIdentityRepr")]
pub struct TypeIdentity {
    /// Module the type was declared in; never empty
    pub module: String,
    /// Enclosing type for nominally nested types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<TypeIdentity>>,
    /// Simple name without module, parents or generics
    pub name: String,
    pub generic_parameters: Vec<GenericParameter>,
    #[serde(default, skip_serializing_if = "PathStyle::is_dotted")]
    pub path_style: PathStyle,
}

/// One entry of a generic parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericParameter {
    Type(TypeIdentity),
    /// A value-level parameter such as the `4` in `[u8; 4]`
    IntegerLiteral {
        name: Option<String>,
        value: u64,
        value_type: TypeIdentity,
    },
}

/// Controls which prefixes [`TypeIdentity::type_name`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameOptions {
    pub with_module: bool,
    pub with_parents: bool,
}

impl NameOptions {
    pub const FULL: NameOptions = NameOptions {
        with_module: true,
        with_parents: true,
    };
    pub const PARENTS: NameOptions = NameOptions {
        with_module: false,
        with_parents: true,
    };
    pub const NONE: NameOptions = NameOptions {
        with_module: false,
        with_parents: false,
    };
}

impl Default for NameOptions {
    fn default() -> Self {
        NameOptions::FULL
    }
}

impl TypeIdentity {
    /// Create an identity in the dotted style
    pub fn new(
        module: impl Into<String>,
        parent: Option<TypeIdentity>,
        name: impl Into<String>,
        generic_parameters: Vec<GenericParameter>,
    ) -> Self {
        Self {
            module: module.into(),
            parent: parent.map(Box::new),
            name: name.into(),
            generic_parameters,
            path_style: PathStyle::Dotted,
        }
    }

    /// Create an identity for a Rust path such as `alloc::vec::Vec`
    pub fn rust(
        module: impl Into<String>,
        name: impl Into<String>,
        generic_parameters: Vec<GenericParameter>,
    ) -> Self {
        Self {
            module: module.into(),
            parent: None,
            name: name.into(),
            generic_parameters,
            path_style: PathStyle::Rust,
        }
    }

    /// Create a zero-generic identity in the root module
    pub fn root(name: impl Into<String>) -> Self {
        Self::rust(ROOT_MODULE, name, Vec::new())
    }

    /// Identity of `T`, parsed from [`std::any::type_name`]
    pub fn of<T: ?Sized>() -> Self {
        Self::parse_lossy(std::any::type_name::<T>())
    }

    /// Parse a fully-qualified type name.
    ///
    /// Type names handed to this function come from the runtime, so a malformed one is a
    /// programming error and panics. Use [`str::parse`] to handle failures instead.
    pub fn parse(input: &str) -> Self {
        match input.parse() {
            Ok(identity) => identity,
            Err(e) => panic!("{}", e),
        }
    }

    /// Parse a runtime type name, falling back to an opaque root identity named after the
    /// whole input when the spelling is not understood
    pub fn parse_lossy(input: &str) -> Self {
        input.parse().unwrap_or_else(|e| {
            warn!("{}; keeping the name as an opaque identity", e);
            Self::root(input)
        })
    }

    pub fn parent(&self) -> Option<&TypeIdentity> {
        self.parent.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.module == ROOT_MODULE
    }

    /// Whether this identity names `Option<_>`
    pub fn is_optional(&self) -> bool {
        let optional = (self.module == "core::option" || self.module == "std::option")
            && self.name == "Option"
            || self.module == "Swift" && self.name == "Optional";
        optional && self.generic_parameters.len() == 1
    }

    /// The first generic parameter, if it is a type
    pub fn first_type_parameter(&self) -> Option<&TypeIdentity> {
        match self.generic_parameters.first() {
            Some(GenericParameter::Type(identity)) => Some(identity),
            _ => None,
        }
    }

    /// Render the identity back into a type name
    pub fn type_name(&self, options: NameOptions) -> String {
        let mut type_name = String::new();
        match &self.parent {
            Some(parent) if options.with_parents => {
                type_name.push_str(&parent.type_name(options));
                type_name.push('.');
            }
            _ if options.with_module && !self.is_root() => {
                type_name.push_str(&self.module);
                type_name.push_str(self.path_style.separator());
            }
            _ => {}
        }
        type_name.push_str(&self.name);

        if !self.generic_parameters.is_empty() {
            let parameters: Vec<String> = self
                .generic_parameters
                .iter()
                .map(|parameter| parameter.type_name(options))
                .collect();
            type_name.push('<');
            type_name.push_str(&parameters.join(", "));
            type_name.push('>');
        }
        type_name
    }
}

impl GenericParameter {
    /// Integer literal parameter as found in `Array<T, 4>`
    pub fn integer(value: u64) -> Self {
        GenericParameter::IntegerLiteral {
            name: None,
            value,
            value_type: TypeIdentity::root(INTEGER_LITERAL_TYPE),
        }
    }

    pub fn type_name(&self, options: NameOptions) -> String {
        match self {
            GenericParameter::Type(identity) => identity.type_name(options),
            GenericParameter::IntegerLiteral { value, .. } => value.to_string(),
        }
    }
}

impl From<TypeIdentity> for GenericParameter {
    fn from(identity: TypeIdentity) -> Self {
        GenericParameter::Type(identity)
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name(NameOptions::FULL))
    }
}

impl FromStr for TypeIdentity {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let mut parser = TypeParser::new(input);
        let identity = parser.parse_type()?;
        parser.skip_whitespace();
        if !parser.rest().is_empty() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(identity)
    }
}

/// Serialized form; `module` may be absent, in which case `name` holds a full type name
#[derive(Deserialize)]
struct TypeIdentityRepr {
    module: Option<String>,
    parent: Option<Box<TypeIdentity>>,
    name: String,
    #[serde(default)]
    generic_parameters: Vec<GenericParameter>,
    #[serde(default)]
    path_style: PathStyle,
}

impl TryFrom<TypeIdentityRepr> for TypeIdentity {
    type Error = Error;

    fn try_from(repr: TypeIdentityRepr) -> Result<Self> {
        match repr.module {
            Some(module) => Ok(TypeIdentity {
                module,
                parent: repr.parent,
                name: repr.name,
                generic_parameters: repr.generic_parameters,
                path_style: repr.path_style,
            }),
            None => {
                let parsed: TypeIdentity = repr.name.parse()?;
                if repr.generic_parameters.is_empty() {
                    Ok(parsed)
                } else {
                    Ok(TypeIdentity {
                        generic_parameters: repr.generic_parameters,
                        ..parsed
                    })
                }
            }
        }
    }
}

/// Recursive-descent parser over a type name
struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", token)))
        }
    }

    /// Return the text up to `delimiter` and move past it
    fn seek(&mut self, delimiter: char) -> Result<&'a str> {
        let rest = self.rest();
        match rest.find(delimiter) {
            Some(index) => {
                self.pos += index + delimiter.len_utf8();
                Ok(&rest[..index])
            }
            None => Err(self.error(&format!("expected '{}'", delimiter))),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }

    fn skip_lifetime(&mut self) {
        if self.peek() == Some('\'') {
            self.pos += 1;
            let rest = self.rest();
            let end = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            self.pos += end;
            self.skip_whitespace();
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::MalformedTypeName {
            input: self.input.to_string(),
            message: format!("{} at offset {}", message, self.pos),
        }
    }

    fn parse_type(&mut self) -> Result<TypeIdentity> {
        self.skip_whitespace();

        if self.eat(EXTENSION_PREFIX) {
            let module = self.seek(')')?.to_string();
            self.expect(":")?;
            let extended = self.parse_type()?;
            return Ok(TypeIdentity { module, ..extended });
        }
        if self.eat("()") {
            return Ok(TypeIdentity::root("Void"));
        }

        match self.peek() {
            Some('(') => return self.parse_tuple(),
            Some('[') => return self.parse_array(),
            Some('&') => {
                self.pos += 1;
                self.skip_lifetime();
                self.eat("mut ");
                return self.parse_type();
            }
            Some('*') => {
                if !(self.eat("*const ") || self.eat("*mut ")) {
                    return Err(self.error("expected a raw pointer"));
                }
                return self.parse_type();
            }
            _ => {}
        }

        if self.eat("for<") {
            self.seek('>')?;
            return self.parse_type();
        }
        if self.eat("unsafe ") {
            return self.parse_type();
        }
        if self.eat("extern ") {
            if self.eat("\"") {
                self.seek('"')?;
            }
            return self.parse_type();
        }
        if self.eat("fn(") {
            return self.parse_fn_pointer();
        }

        if self.eat("dyn ") {
            let principal = self.parse_type()?;
            loop {
                self.skip_whitespace();
                if !self.eat("+") {
                    break;
                }
                self.skip_whitespace();
                if self.peek() == Some('\'') {
                    self.skip_lifetime();
                } else {
                    self.parse_type()?;
                }
            }
            return Ok(principal);
        }

        self.parse_path()
    }

    fn parse_tuple(&mut self) -> Result<TypeIdentity> {
        self.expect("(")?;
        let mut elements = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(")") {
                break;
            }
            elements.push(GenericParameter::Type(self.parse_type()?));
            self.skip_whitespace();
            if !self.eat(",") {
                self.expect(")")?;
                break;
            }
        }
        Ok(TypeIdentity::rust(ROOT_MODULE, "Tuple", elements))
    }

    /// `fn(A, B) -> R` becomes `Fn<A, B, R>`; a missing return type is `Void`
    fn parse_fn_pointer(&mut self) -> Result<TypeIdentity> {
        let mut parameters = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(")") {
                break;
            }
            if self.eat("...") {
                self.skip_whitespace();
                self.expect(")")?;
                break;
            }
            parameters.push(GenericParameter::Type(self.parse_type()?));
            self.skip_whitespace();
            if !self.eat(",") {
                self.expect(")")?;
                break;
            }
        }

        self.skip_whitespace();
        let output = if self.eat("->") {
            self.parse_type()?
        } else {
            TypeIdentity::root("Void")
        };
        parameters.push(GenericParameter::Type(output));
        Ok(TypeIdentity::rust(ROOT_MODULE, "Fn", parameters))
    }

    fn parse_array(&mut self) -> Result<TypeIdentity> {
        self.expect("[")?;
        let element = GenericParameter::Type(self.parse_type()?);
        self.skip_whitespace();
        if self.eat(";") {
            self.skip_whitespace();
            let length = self.parse_integer_literal()?;
            self.skip_whitespace();
            self.expect("]")?;
            return Ok(TypeIdentity::rust(
                ROOT_MODULE,
                "Array",
                vec![element, length],
            ));
        }
        self.expect("]")?;
        Ok(TypeIdentity::rust(ROOT_MODULE, "Slice", vec![element]))
    }

    fn parse_path(&mut self) -> Result<TypeIdentity> {
        let mut modules: Vec<String> = Vec::new();
        let mut name = self.parse_segment()?;
        while self.eat("::") {
            modules.push(std::mem::replace(&mut name, self.parse_segment()?));
        }

        let (module, path_style) = if !modules.is_empty() {
            (modules.join("::"), PathStyle::Rust)
        } else if self.eat(".") {
            let module = std::mem::replace(&mut name, self.parse_segment()?);
            if module == STANDARD_MODULE && self.is_reserved_end(&name) {
                return Ok(TypeIdentity::root(name));
            }
            (module, PathStyle::Dotted)
        } else if RESERVED_NAMES.contains(&name.as_str()) {
            return Ok(TypeIdentity::root(name));
        } else {
            (ROOT_MODULE.to_string(), PathStyle::Rust)
        };

        let mut parent: Option<TypeIdentity> = None;
        let mut generic_parameters = Vec::new();
        loop {
            if self.eat("<") {
                generic_parameters = self.parse_generic_list()?;
            } else if self.eat(".") {
                let owner = TypeIdentity {
                    module: module.clone(),
                    parent: parent.take().map(Box::new),
                    name,
                    generic_parameters: std::mem::take(&mut generic_parameters),
                    path_style,
                };
                parent = Some(owner);
                name = self.parse_segment()?;
            } else {
                break;
            }
        }

        Ok(TypeIdentity {
            module,
            parent: parent.map(Box::new),
            name,
            generic_parameters,
            path_style,
        })
    }

    /// Whether `name` is a reserved name with nothing nested in it or applied to it
    fn is_reserved_end(&self, name: &str) -> bool {
        RESERVED_NAMES.contains(&name) && !matches!(self.peek(), Some('.') | Some('<'))
    }

    /// A single path segment; `<impl ...>` style qualified segments are kept verbatim
    fn parse_segment(&mut self) -> Result<String> {
        if self.rest().starts_with(UNKNOWN_CONTEXT_PREFIX) {
            self.seek(')')?;
            self.expect(".")?;
        }
        if self.peek() == Some('<') {
            return self.parse_qualified_segment();
        }

        let rest = self.rest();
        let end = rest
            .find(|c: char| SEGMENT_TERMINATORS.contains(&c))
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error("expected an identifier"));
        }
        self.pos += end;
        Ok(rest[..end].to_string())
    }

    fn parse_qualified_segment(&mut self) -> Result<String> {
        let rest = self.rest();
        let mut depth = 0usize;
        for (index, c) in rest.char_indices() {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += index + 1;
                        return Ok(rest[..=index].to_string());
                    }
                }
                _ => {}
            }
        }
        Err(self.error("unbalanced '<' in qualified path segment"))
    }

    fn parse_generic_list(&mut self) -> Result<Vec<GenericParameter>> {
        let mut parameters = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(">") {
                return Ok(parameters);
            }
            match self.peek() {
                Some('\'') => self.skip_lifetime(),
                Some(c) if c.is_ascii_digit() => parameters.push(self.parse_integer_literal()?),
                _ => parameters.push(GenericParameter::Type(self.parse_type()?)),
            }
            self.skip_whitespace();
            if self.eat(",") {
                continue;
            }
            self.expect(">")?;
            return Ok(parameters);
        }
    }

    fn parse_integer_literal(&mut self) -> Result<GenericParameter> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let value = rest[..end]
            .parse::<u64>()
            .map_err(|e| self.error(&format!("invalid integer literal: {}", e)))?;
        self.pos += end;
        Ok(GenericParameter::integer(value))
    }
}
