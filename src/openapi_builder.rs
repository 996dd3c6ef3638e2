use crate::classifier::{
    is_basic_type, is_collection_type, ParameterDescriptor, ParameterLocation,
};
use crate::coordinator::{ApiDescription, RouteDescription};
use crate::extractor::{template_placeholders, HttpMethod};
use crate::handler_resolver::HandlerDescriptor;
use crate::schema_generator::{Schema, SchemaGenerator};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// OpenAPI version written to every document
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Error responses attached to every operation
const ERROR_RESPONSES: &[(&str, &str)] = &[
    ("400", "Bad Request"),
    ("401", "Unauthorized"),
    ("403", "Forbidden"),
    ("404", "Not Found"),
    ("500", "Internal Server Error"),
];

/// Handler name keywords and the summary verb they produce, in match order
const SUMMARY_KEYWORDS: &[(&str, &str)] = &[
    ("get", "Get"),
    ("create", "Create"),
    ("update", "Update"),
    ("delete", "Delete"),
    ("list", "List"),
];

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Paths collection (URL template -> PathItem)
    paths: BTreeMap<String, PathItem>,
    /// Operation IDs handed out so far
    operation_ids: HashSet<String>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    /// The operation slot for a concrete method.
    fn slot(&mut self, method: HttpMethod) -> Option<&mut Option<Operation>> {
        match method {
            HttpMethod::Get => Some(&mut self.get),
            HttpMethod::Post => Some(&mut self.post),
            HttpMethod::Put => Some(&mut self.put),
            HttpMethod::Delete => Some(&mut self.delete),
            HttpMethod::Patch => Some(&mut self.patch),
            HttpMethod::Options => Some(&mut self.options),
            HttpMethod::Head => Some(&mut self.head),
            HttpMethod::Any => None,
        }
    }

    /// The operation registered for a concrete method, if any.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Any => None,
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation summary
    pub summary: String,
    /// Operation description
    pub description: String,
    /// Tags grouping the operation
    pub tags: Vec<String>,
    /// Operation ID
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters (path, query, header)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<Parameter>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    pub responses: BTreeMap<String, Response>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header)
    #[serde(rename = "in")]
    pub location: String,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    pub schemas: BTreeMap<String, Schema>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
    /// Components (schemas, etc.)
    pub components: Components,
}

fn json_content(schema: Schema) -> BTreeMap<String, MediaType> {
    BTreeMap::from([("application/json".to_string(), MediaType { schema })])
}

/// `{error, message}` object used by every error response
fn error_body_schema() -> Schema {
    Schema::object(
        BTreeMap::from([
            ("error".to_string(), Schema::typed("string", "")),
            ("message".to_string(), Schema::typed("string", "")),
        ]),
        Vec::new(),
    )
}

/// Shared `Error` component schema
fn error_component_schema() -> Schema {
    Schema::object(
        BTreeMap::from([
            ("error".to_string(), Schema::typed("string", "")),
            ("message".to_string(), Schema::typed("string", "")),
            ("code".to_string(), Schema::typed("integer", "")),
        ]),
        Vec::new(),
    )
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Auto-Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: None,
            },
            paths: BTreeMap::new(),
            operation_ids: HashSet::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: impl Into<String>, version: impl Into<String>) -> Self {
        self.info.title = title.into();
        self.info.version = version.into();
        self
    }

    /// Add every route of an analysis run
    pub fn add_api(&mut self, api: &ApiDescription, schema_gen: &mut SchemaGenerator) {
        for route in &api.routes {
            self.add_route(route, schema_gen);
        }
    }

    /// Add a route to the OpenAPI document
    ///
    /// `ANY` registrations produce one operation per concrete method. A later
    /// registration of the same path and method replaces the earlier one.
    pub fn add_route(&mut self, route: &RouteDescription, schema_gen: &mut SchemaGenerator) {
        let methods: &[HttpMethod] = match route.route.method {
            HttpMethod::Any => &HttpMethod::CONCRETE,
            ref method => std::slice::from_ref(method),
        };

        for &method in methods {
            debug!("Adding route: {} {}", method, route.route.url_template);
            let operation = self.build_operation(route, method, schema_gen);
            let path_item = self
                .paths
                .entry(route.route.url_template.clone())
                .or_default();
            if let Some(slot) = path_item.slot(method) {
                *slot = Some(operation);
            }
        }
    }

    fn build_operation(
        &mut self,
        route: &RouteDescription,
        method: HttpMethod,
        schema_gen: &mut SchemaGenerator,
    ) -> Operation {
        let path = &route.route.url_template;
        let handler = route.handler.as_ref();

        let mut parameters = handler
            .map(|h| Self::handler_parameters(h, schema_gen))
            .unwrap_or_default();
        Self::add_uncovered_placeholders(path, &mut parameters);

        Operation {
            summary: summary(&route.route.handler_reference, method, path),
            description: format!("Automatically generated endpoint for {} {}", method, path),
            tags: vec![tag(path)],
            operation_id: handler.map(|h| self.unique_operation_id(&h.name, method)),
            parameters,
            request_body: handler.and_then(|h| Self::request_body(h, schema_gen)),
            responses: Self::responses(handler, method, schema_gen),
        }
    }

    /// Non-body parameters of the handler, in declaration order followed by
    /// body bindings, unique by location and name.
    fn handler_parameters(
        handler: &HandlerDescriptor,
        schema_gen: &SchemaGenerator,
    ) -> Vec<Parameter> {
        let mut parameters: Vec<Parameter> = Vec::new();

        let mut descriptors = Vec::new();
        for descriptor in handler.parameters.iter().chain(handler.body_bindings.iter()) {
            collect_scalars(descriptor, &mut descriptors);
        }

        for descriptor in descriptors {
            let Some(param_schema) = schema_gen.generate_parameter_schema(descriptor) else {
                continue;
            };
            let duplicate = parameters
                .iter()
                .any(|p| p.name == param_schema.name && p.location == param_schema.location);
            if duplicate {
                continue;
            }
            parameters.push(Parameter {
                name: param_schema.name,
                location: param_schema.location,
                description: Some(format!("{} parameter", descriptor.name)),
                required: param_schema.required,
                schema: param_schema.schema,
            });
        }

        parameters
    }

    /// Placeholders of the template that no parameter describes become
    /// required string path parameters.
    fn add_uncovered_placeholders(path: &str, parameters: &mut Vec<Parameter>) {
        for placeholder in template_placeholders(path) {
            let covered = parameters
                .iter()
                .any(|p| p.location == "path" && p.name == placeholder);
            if !covered {
                parameters.push(Parameter {
                    name: placeholder,
                    location: "path".to_string(),
                    description: None,
                    required: true,
                    schema: Schema::typed("string", ""),
                });
            }
        }
    }

    /// Request body from the first body-located descriptor that carries
    /// body content.
    ///
    /// Expanded composites whose fields are all bound elsewhere (path,
    /// query, header) are passed over.
    fn request_body(
        handler: &HandlerDescriptor,
        schema_gen: &mut SchemaGenerator,
    ) -> Option<RequestBody> {
        let body = handler
            .parameters
            .iter()
            .chain(handler.body_bindings.iter())
            .filter(|p| p.location == ParameterLocation::Body)
            .find(|p| {
                p.sub_parameters.is_empty()
                    || p.sub_parameters
                        .iter()
                        .any(|f| f.location == ParameterLocation::Body)
            })?;
        debug!("Request body of {} from {}", handler.name, body.name);

        Some(RequestBody {
            description: Some(format!("{} data", body.name)),
            required: body.required,
            content: json_content(schema_gen.body_schema(body)),
        })
    }

    fn responses(
        handler: Option<&HandlerDescriptor>,
        method: HttpMethod,
        schema_gen: &SchemaGenerator,
    ) -> BTreeMap<String, Response> {
        let success_code = match method {
            HttpMethod::Post => "201",
            HttpMethod::Delete => "204",
            _ => "200",
        };

        let content = handler
            .and_then(|h| h.primary_return_type.as_deref())
            .filter(|return_type| *return_type != "error" && success_code != "204")
            .map(|return_type| json_content(schema_gen.schema_for_type(return_type)));

        let mut responses = BTreeMap::new();
        responses.insert(
            success_code.to_string(),
            Response {
                description: "Success".to_string(),
                content,
            },
        );

        for (code, description) in ERROR_RESPONSES {
            responses.insert(
                code.to_string(),
                Response {
                    description: description.to_string(),
                    content: Some(json_content(error_body_schema())),
                },
            );
        }

        responses
    }

    /// Handler name, suffixed with the method (and a counter if needed) when
    /// it is already taken.
    fn unique_operation_id(&mut self, name: &str, method: HttpMethod) -> String {
        let mut candidate = name.to_string();
        if self.operation_ids.contains(&candidate) {
            candidate = format!("{}_{}", name, method.as_str().to_lowercase());
        }
        let base = candidate.clone();
        let mut counter = 2;
        while self.operation_ids.contains(&candidate) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        self.operation_ids.insert(candidate.clone());
        candidate
    }

    /// Build the final OpenAPI document
    pub fn build(self, mut schema_gen: SchemaGenerator) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        schema_gen.register("Error", error_component_schema());
        let schemas = schema_gen.into_schemas();

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            paths: self.paths,
            components: Components { schemas },
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Leaf descriptors that can stand as a single parameter. Expanded composites
/// contribute their fields; unexpanded named structs contribute nothing.
fn collect_scalars<'d>(descriptor: &'d ParameterDescriptor, out: &mut Vec<&'d ParameterDescriptor>) {
    if !descriptor.sub_parameters.is_empty() {
        for field in &descriptor.sub_parameters {
            collect_scalars(field, out);
        }
    } else if is_basic_type(&descriptor.type_name) || is_collection_type(&descriptor.type_name) {
        out.push(descriptor);
    }
}

/// Summary from keywords in the handler's last name segment.
fn summary(handler_reference: &str, method: HttpMethod, path: &str) -> String {
    let name = handler_reference
        .rsplit('.')
        .next()
        .unwrap_or(handler_reference)
        .to_lowercase();

    match SUMMARY_KEYWORDS
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
    {
        Some((_, verb)) => format!("{} {}", verb, resource_name(path)),
        None => format!("{} operation", method),
    }
}

/// Last path segment that is not a placeholder, capitalized.
fn resource_name(path: &str) -> String {
    let segment = path
        .split('/')
        .filter(|s| !s.is_empty() && !(s.starts_with('{') && s.ends_with('}')))
        .last();

    match segment {
        Some(segment) => {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => "Resource".to_string(),
            }
        }
        None => "Resource".to_string(),
    }
}

/// First non-empty path segment, or `api`.
fn tag(path: &str) -> String {
    path.split('/')
        .find(|s| !s.is_empty())
        .unwrap_or("api")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{HandlerKind, RouteDescriptor};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn route(method: HttpMethod, path: &str, handler: &str) -> RouteDescriptor {
        RouteDescriptor {
            method,
            url_template: path.to_string(),
            handler_reference: handler.to_string(),
            handler_kind: HandlerKind::Function,
            source_file: PathBuf::from("main.go"),
            source_line: 1,
        }
    }

    fn param(
        name: &str,
        type_name: &str,
        location: ParameterLocation,
        required: bool,
    ) -> ParameterDescriptor {
        ParameterDescriptor {
            name: name.to_string(),
            type_name: type_name.to_string(),
            location,
            required,
            external_name: name.to_string(),
            sub_parameters: Vec::new(),
        }
    }

    fn handler(name: &str, parameters: Vec<ParameterDescriptor>) -> HandlerDescriptor {
        HandlerDescriptor {
            name: name.to_string(),
            declaring_scope: "main".to_string(),
            source_file: PathBuf::from("main.go"),
            parameters,
            body_bindings: Vec::new(),
            primary_return_type: None,
            has_error_return: false,
        }
    }

    fn build(routes: Vec<RouteDescription>) -> OpenApiDocument {
        let mut schema_gen = SchemaGenerator::new();
        let mut builder = OpenApiBuilder::new().with_info("Test API", "2.0.0");
        for r in &routes {
            builder.add_route(r, &mut schema_gen);
        }
        builder.build(schema_gen)
    }

    #[test]
    fn test_document_skeleton() {
        let doc = build(vec![]);
        assert_eq!(doc.openapi, "3.0.3");
        assert_eq!(doc.info.title, "Test API");
        assert_eq!(doc.info.version, "2.0.0");
        assert!(doc.paths.is_empty());

        let error = &doc.components.schemas["Error"];
        let keys: Vec<&String> = error.properties.as_ref().unwrap().keys().collect();
        assert_eq!(keys, vec!["code", "error", "message"]);
    }

    #[test]
    fn test_unresolved_route() {
        let doc = build(vec![RouteDescription {
            route: route(HttpMethod::Post, "/users", "CreateUser"),
            handler: None,
        }]);

        let op = doc.paths["/users"].post.as_ref().unwrap();
        assert_eq!(op.summary, "Create Users");
        assert_eq!(op.description, "Automatically generated endpoint for POST /users");
        assert_eq!(op.tags, vec!["users".to_string()]);
        assert!(op.parameters.is_empty());
        assert!(op.request_body.is_none());
        assert!(op.operation_id.is_none());

        let codes: Vec<&String> = op.responses.keys().collect();
        assert_eq!(codes, vec!["201", "400", "401", "403", "404", "500"]);
        assert_eq!(op.responses["404"].description, "Not Found");
    }

    #[test]
    fn test_summary_and_tags() {
        assert_eq!(summary("h.GetUser", HttpMethod::Get, "/users/{id}"), "Get Users");
        assert_eq!(summary("ListProducts", HttpMethod::Get, "/products"), "List Products");
        assert_eq!(summary("h.Remove", HttpMethod::Delete, "/x"), "DELETE operation");
        assert_eq!(summary("updateThing", HttpMethod::Put, "/"), "Update Resource");
        assert_eq!(summary("anonymous", HttpMethod::Patch, "/a"), "PATCH operation");
        assert_eq!(tag("/users/{id}"), "users");
        assert_eq!(tag("/"), "api");
    }

    #[test]
    fn test_path_parameters_and_subparameters() {
        let mut req = param("req", "struct{}", ParameterLocation::Body, false);
        req.sub_parameters = vec![
            ParameterDescriptor {
                external_name: "id".to_string(),
                ..param("ID", "int", ParameterLocation::Path, false)
            },
            param("Secret", "string", ParameterLocation::Unclassified, true),
        ];
        let h = handler(
            "GetUser",
            vec![param("ctx", "Context", ParameterLocation::Context, false), req],
        );

        let doc = build(vec![RouteDescription {
            route: route(HttpMethod::Get, "/users/{id}", "handler.GetUser"),
            handler: Some(h),
        }]);
        let op = doc.paths["/users/{id}"].get.as_ref().unwrap();

        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].name, "id");
        assert_eq!(op.parameters[0].location, "path");
        assert!(op.parameters[0].required);
        assert_eq!(op.parameters[0].schema, Schema::typed("integer", "int64"));
        assert!(op.request_body.is_none());
        assert_eq!(op.operation_id.as_deref(), Some("GetUser"));
    }

    #[test]
    fn test_uncovered_placeholder_added() {
        let doc = build(vec![RouteDescription {
            route: route(HttpMethod::Get, "/orgs/{org}/members", "members"),
            handler: None,
        }]);
        let op = doc.paths["/orgs/{org}/members"].get.as_ref().unwrap();
        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].name, "org");
        assert!(op.parameters[0].required);
        assert_eq!(op.parameters[0].schema, Schema::typed("string", ""));
    }

    #[test]
    fn test_request_body_from_first_body_parameter() {
        let mut first = param("req", "CreateUserRequest", ParameterLocation::Body, true);
        first.sub_parameters = vec![param("name", "string", ParameterLocation::Body, true)];
        let second = param("extra", "Other", ParameterLocation::Body, false);
        let h = handler("CreateUser", vec![first, second]);

        let doc = build(vec![RouteDescription {
            route: route(HttpMethod::Post, "/users", "CreateUser"),
            handler: Some(h),
        }]);
        let op = doc.paths["/users"].post.as_ref().unwrap();
        let body = op.request_body.as_ref().unwrap();

        assert_eq!(body.description.as_deref(), Some("req data"));
        assert!(body.required);
        assert_eq!(
            body.content["application/json"].schema,
            Schema::reference("CreateUserRequest")
        );
        assert!(doc.components.schemas.contains_key("CreateUserRequest"));
        assert!(!doc.components.schemas.contains_key("Other"));
    }

    #[test]
    fn test_request_body_skips_composites_without_body_fields() {
        let mut path_only = param("pathParams", "struct{}", ParameterLocation::Body, false);
        path_only.sub_parameters = vec![param("ID", "int", ParameterLocation::Path, true)];
        let mut payload = param("bodyParams", "UpdateUserRequest", ParameterLocation::Body, false);
        payload.sub_parameters = vec![
            param("ID", "int", ParameterLocation::Path, true),
            param("email", "string", ParameterLocation::Body, false),
        ];
        let mut h = handler("UpdateUser", vec![]);
        h.body_bindings = vec![path_only, payload];

        let doc = build(vec![RouteDescription {
            route: route(HttpMethod::Put, "/users/{ID}", "h.UpdateUser"),
            handler: Some(h),
        }]);
        let op = doc.paths["/users/{ID}"].put.as_ref().unwrap();

        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].name, "ID");
        let body = op.request_body.as_ref().unwrap();
        assert_eq!(body.description.as_deref(), Some("bodyParams data"));
        let component = &doc.components.schemas["UpdateUserRequest"];
        let keys: Vec<&String> = component.properties.as_ref().unwrap().keys().collect();
        assert_eq!(keys, vec!["email"]);
    }

    #[test]
    fn test_form_and_bindings_surface_as_query() {
        let mut h = handler(
            "Search",
            vec![param("c", "*gin.Context", ParameterLocation::Context, false)],
        );
        h.body_bindings = vec![
            param("q", "string", ParameterLocation::Form, false),
            param("X-Trace", "string", ParameterLocation::Header, false),
        ];

        let doc = build(vec![RouteDescription {
            route: route(HttpMethod::Get, "/search", "Search"),
            handler: Some(h),
        }]);
        let op = doc.paths["/search"].get.as_ref().unwrap();
        let locations: Vec<(&str, &str)> = op
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.location.as_str()))
            .collect();
        assert_eq!(locations, vec![("q", "query"), ("X-Trace", "header")]);
    }

    #[test]
    fn test_success_content_from_return_type() {
        let mut getter = handler("GetUser", vec![]);
        getter.primary_return_type = Some("[]User".to_string());
        let mut deleter = handler("DeleteUser", vec![]);
        deleter.primary_return_type = Some("bool".to_string());
        let mut failing = handler("Ping", vec![]);
        failing.primary_return_type = Some("error".to_string());

        let doc = build(vec![
            RouteDescription {
                route: route(HttpMethod::Get, "/users", "GetUser"),
                handler: Some(getter),
            },
            RouteDescription {
                route: route(HttpMethod::Delete, "/users/{id}", "DeleteUser"),
                handler: Some(deleter),
            },
            RouteDescription {
                route: route(HttpMethod::Get, "/ping", "Ping"),
                handler: Some(failing),
            },
        ]);

        let get = doc.paths["/users"].get.as_ref().unwrap();
        let schema = &get.responses["200"].content.as_ref().unwrap()["application/json"].schema;
        assert_eq!(schema.schema_type.as_deref(), Some("array"));

        let delete = doc.paths["/users/{id}"].delete.as_ref().unwrap();
        assert!(delete.responses["204"].content.is_none());

        let ping = doc.paths["/ping"].get.as_ref().unwrap();
        assert!(ping.responses["200"].content.is_none());
    }

    #[test]
    fn test_any_expands_to_all_methods() {
        let doc = build(vec![RouteDescription {
            route: route(HttpMethod::Any, "/echo", "Echo"),
            handler: Some(handler("Echo", vec![])),
        }]);
        let item = &doc.paths["/echo"];

        for method in HttpMethod::CONCRETE {
            assert!(item.operation(method).is_some(), "{method}");
        }
        assert_eq!(item.get.as_ref().unwrap().operation_id.as_deref(), Some("Echo"));
        assert_eq!(
            item.post.as_ref().unwrap().operation_id.as_deref(),
            Some("Echo_post")
        );
    }

    #[test]
    fn test_operation_ids_are_unique() {
        let doc = build(vec![
            RouteDescription {
                route: route(HttpMethod::Get, "/a", "Show"),
                handler: Some(handler("Show", vec![])),
            },
            RouteDescription {
                route: route(HttpMethod::Get, "/b", "Show"),
                handler: Some(handler("Show", vec![])),
            },
            RouteDescription {
                route: route(HttpMethod::Get, "/c", "Show"),
                handler: Some(handler("Show", vec![])),
            },
        ]);
        let ids: Vec<&str> = ["/a", "/b", "/c"]
            .iter()
            .map(|p| doc.paths[*p].get.as_ref().unwrap().operation_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["Show", "Show_get", "Show_get_2"]);
    }

    #[test]
    fn test_serialized_operation_shape() {
        let doc = build(vec![RouteDescription {
            route: route(HttpMethod::Get, "/health", "Health"),
            handler: None,
        }]);
        let value = serde_json::to_value(&doc).unwrap();
        let op = &value["paths"]["/health"]["get"];

        assert!(op.get("parameters").is_none());
        assert!(op.get("requestBody").is_none());
        assert_eq!(op["responses"]["200"]["description"], "Success");
        assert_eq!(
            op["responses"]["500"]["content"]["application/json"]["schema"]["type"],
            "object"
        );
    }
}
