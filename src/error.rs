use std::fmt::Display;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    /// A type name string could not be parsed into a [`crate::type_identity::TypeIdentity`]
    MalformedTypeName { input: String, message: String },
    /// A type's `Deserialize` implementation rejected the placeholder data it was fed
    Decode(String),
    /// A `Deserialize` implementation asked for a field the placeholder data did not carry
    MissingField(&'static str),
    /// A `Deserialize` implementation saw a variant name it does not declare
    UnknownVariant {
        variant: String,
        expected: &'static [&'static str],
    },
    /// A media type string is not of the form `type/subtype; key=value`
    MalformedMediaType(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::MalformedTypeName { input, message } => {
                write!(f, "Malformed type name '{}': {}", input, message)
            }
            Error::Decode(msg) => write!(f, "Shape decoding failed: {}", msg),
            Error::MissingField(field) => {
                write!(f, "Shape decoding failed: missing field `{}`", field)
            }
            Error::UnknownVariant { variant, expected } => write!(
                f,
                "Shape decoding failed: unknown variant `{}`, expected one of {}",
                variant,
                expected.join(", ")
            ),
            Error::MalformedMediaType(input) => write!(f, "Malformed media type '{}'", input),
        }
    }
}

impl std::error::Error for Error {}

impl serde::de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Decode(msg.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        Error::MissingField(field)
    }

    fn unknown_variant(variant: &str, expected: &'static [&'static str]) -> Self {
        Error::UnknownVariant {
            variant: variant.to_string(),
            expected,
        }
    }
}
