use crate::error::Result;
use crate::openapi_builder::OpenApiDocument;
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an OpenAPI document to YAML.
///
/// # Errors
///
/// Returns [`Error::Serialization`](crate::error::Error::Serialization) if
/// serde_yaml rejects the document.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes an OpenAPI document to pretty-printed JSON.
///
/// # Example
///
/// ```
/// use go_openapi_from_source::openapi_builder::OpenApiBuilder;
/// use go_openapi_from_source::schema_generator::SchemaGenerator;
/// use go_openapi_from_source::serializer::serialize_json;
///
/// let doc = OpenApiBuilder::new().build(SchemaGenerator::new());
/// let json = serialize_json(&doc).unwrap();
/// assert!(json.contains("\"openapi\": \"3.0.3\""));
/// ```
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Writes content to `path`, creating missing parent directories and
/// overwriting an existing file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
