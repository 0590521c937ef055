//! Serialization module for writing documentation structures as YAML or JSON.
//!
//! Any serializable value of the crate (a [`crate::docs_context::DocsViewContext`], a single
//! [`crate::documentation::EndpointDocumentation`], a parsed
//! [`crate::type_identity::TypeIdentity`]) can be turned into a string and written to a file.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes a value to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use route_docs::documentation::{EndpointDocumentation, Payload};
/// use route_docs::route::HttpMethod;
/// use route_docs::serializer::serialize_yaml;
///
/// let documentation = EndpointDocumentation::new(HttpMethod::Get, "/status")
///     .with_response(Payload::json::<String>().unwrap());
/// let yaml = serialize_yaml(&documentation).unwrap();
/// assert!(yaml.contains("path: status"));
/// ```
pub fn serialize_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    debug!("Serializing {} to YAML", std::any::type_name::<T>());
    serde_yaml::to_string(value).context("Failed to serialize documentation to YAML")
}

/// Serializes a value to JSON format with pretty printing.
///
/// The output is indented for readability, making it suitable for human review and
/// version control.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    debug!("Serializing {} to JSON", std::any::type_name::<T>());
    serde_json::to_string_pretty(value).context("Failed to serialize documentation to JSON")
}

/// Writes string content to a file.
///
/// Creates the file and its parent directories if they don't exist, or overwrites the
/// file if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
