use crate::classifier::{ParameterDescriptor, ParameterLocation};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema type and format for a Go type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaType {
    pub schema_type: &'static str,
    /// Empty when the type has no format
    pub format: &'static str,
}

impl SchemaType {
    const fn new(schema_type: &'static str, format: &'static str) -> Self {
        Self {
            schema_type,
            format,
        }
    }
}

/// Maps a Go type name to its OpenAPI type and format.
///
/// Leading pointer markers are ignored. Unknown names, user-defined
/// structs included, map to `object`.
pub fn map_type(type_name: &str) -> SchemaType {
    let name = type_name.trim_start_matches('*');
    match name {
        "string" => SchemaType::new("string", ""),
        "int8" | "int16" | "int32" | "uint8" | "uint16" | "uint32" | "rune" => {
            SchemaType::new("integer", "int32")
        }
        "int" | "int64" | "uint" | "uint64" | "uintptr" => SchemaType::new("integer", "int64"),
        "float32" => SchemaType::new("number", "float"),
        "float64" => SchemaType::new("number", "double"),
        "bool" => SchemaType::new("boolean", ""),
        "byte" => SchemaType::new("string", "byte"),
        "time.Time" => SchemaType::new("string", "date-time"),
        _ if name.starts_with("[]") => SchemaType::new("array", ""),
        _ if name.starts_with("map[") => SchemaType::new("object", ""),
        _ => SchemaType::new("object", ""),
    }
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Reference to another schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Schema {
    /// Schema with only a type and optional format.
    pub fn typed(schema_type: &str, format: &str) -> Self {
        Schema {
            schema_type: Some(schema_type.to_string()),
            format: (!format.is_empty()).then(|| format.to_string()),
            ..Default::default()
        }
    }

    /// `$ref` to a component schema.
    pub fn reference(name: &str) -> Self {
        Schema {
            reference: Some(format!("#/components/schemas/{}", name)),
            ..Default::default()
        }
    }

    /// Object schema from ordered properties; `required` is omitted when empty.
    pub fn object(properties: BTreeMap<String, Schema>, required: Vec<String>) -> Self {
        Schema {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            required: (!required.is_empty()).then_some(required),
            ..Default::default()
        }
    }
}

/// Parameter schema for OpenAPI parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header)
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Schema for the parameter
    pub schema: Schema,
}

/// Schema generator - converts classified descriptors to OpenAPI schemas
///
/// Named struct types become component schemas, collected here until the
/// document is assembled.
#[derive(Debug, Default)]
pub struct SchemaGenerator {
    schemas: BTreeMap<String, Schema>,
}

impl SchemaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a schema for a Go type name
    pub fn schema_for_type(&self, type_name: &str) -> Schema {
        let mapped = map_type(type_name);
        let mut schema = Schema::typed(mapped.schema_type, mapped.format);

        if mapped.schema_type == "array" {
            let element = type_name
                .trim_start_matches('*')
                .trim_start_matches("[]");
            schema.items = Some(Box::new(self.schema_for_type(element)));
        }

        schema
    }

    /// Generate a schema for a classified parameter or field.
    ///
    /// Expanded composites become inline objects whose properties are the
    /// body-located fields, keyed by external name.
    pub fn schema_for_descriptor(&self, descriptor: &ParameterDescriptor) -> Schema {
        if descriptor.sub_parameters.is_empty() {
            return self.schema_for_type(&descriptor.type_name);
        }

        let mut properties = BTreeMap::new();
        let mut required = Vec::new();

        for field in descriptor
            .sub_parameters
            .iter()
            .filter(|f| f.location == ParameterLocation::Body)
        {
            properties.insert(field.external_name.clone(), self.schema_for_descriptor(field));
            if field.required {
                required.push(field.external_name.clone());
            }
        }

        Schema::object(properties, required)
    }

    /// Schema for a request body, registering named structs as components.
    ///
    /// Returns a `$ref` for expanded named struct types and an inline schema
    /// for everything else.
    pub fn body_schema(&mut self, descriptor: &ParameterDescriptor) -> Schema {
        let name = descriptor.type_name.trim_start_matches('*');
        let is_named_struct = !descriptor.sub_parameters.is_empty()
            && name != "struct{}"
            && !name.contains('.');

        if !is_named_struct {
            return self.schema_for_descriptor(descriptor);
        }

        if !self.schemas.contains_key(name) {
            debug!("Generating component schema for: {}", name);
            let schema = self.schema_for_descriptor(descriptor);
            self.schemas.insert(name.to_string(), schema);
        }
        Schema::reference(name)
    }

    /// Add a component schema under a fixed name, keeping an existing one.
    pub fn register(&mut self, name: &str, schema: Schema) {
        self.schemas.entry(name.to_string()).or_insert(schema);
    }

    /// Generate a parameter schema from a visible, non-body descriptor.
    ///
    /// Form values surface as query parameters; path parameters are always
    /// required.
    pub fn generate_parameter_schema(&self, param: &ParameterDescriptor) -> Option<ParameterSchema> {
        let location = match param.location {
            ParameterLocation::Path => "path",
            ParameterLocation::Query | ParameterLocation::Form => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Body
            | ParameterLocation::Context
            | ParameterLocation::Unclassified => return None,
        };

        Some(ParameterSchema {
            name: param.external_name.clone(),
            location: location.to_string(),
            required: param.required || param.location == ParameterLocation::Path,
            schema: self.schema_for_type(&param.type_name),
        })
    }

    /// Take the generated component schemas
    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas
    }
}
