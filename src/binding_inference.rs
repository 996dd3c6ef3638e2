//! Request inputs read through the Gin context inside a handler body.
//!
//! Most Gin handlers declare a single `*gin.Context` parameter and pull
//! their inputs from it: `c.Param("id")`, `c.Query("page")`,
//! `c.ShouldBindJSON(&req)` and so on. This module scans a resolved
//! handler's body for those calls and turns each into a
//! [`ParameterDescriptor`].

use crate::classifier::{ParameterClassifier, ParameterDescriptor, ParameterLocation};
use crate::extractor::gin::unquote;
use crate::handler_resolver::ResolvedHandler;
use crate::parser::{named_descendants, ParsedFile};
use crate::type_resolver::type_text;
use log::debug;
use std::collections::HashSet;
use tree_sitter::Node;

/// What a context method reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accessor {
    /// A single named value, e.g. `c.Query("page")`
    Value {
        location: ParameterLocation,
        type_name: &'static str,
    },
    /// Binds into a variable, e.g. `c.ShouldBindJSON(&req)`
    Bind(BindTarget),
    /// `ShouldBindWith(&v, binding.X)`; the target follows the second argument
    BindWith,
}

/// Where a struct binding reads its fields from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindTarget {
    Body,
    Uri,
    Query,
    Header,
}

const fn value(location: ParameterLocation) -> Accessor {
    Accessor::Value {
        location,
        type_name: "string",
    }
}

const ACCESSORS: &[(&str, Accessor)] = &[
    ("Param", value(ParameterLocation::Path)),
    ("Query", value(ParameterLocation::Query)),
    ("DefaultQuery", value(ParameterLocation::Query)),
    ("GetQuery", value(ParameterLocation::Query)),
    (
        "QueryArray",
        Accessor::Value {
            location: ParameterLocation::Query,
            type_name: "[]string",
        },
    ),
    ("GetHeader", value(ParameterLocation::Header)),
    ("PostForm", value(ParameterLocation::Form)),
    ("DefaultPostForm", value(ParameterLocation::Form)),
    ("GetPostForm", value(ParameterLocation::Form)),
    ("ShouldBindJSON", Accessor::Bind(BindTarget::Body)),
    ("BindJSON", Accessor::Bind(BindTarget::Body)),
    ("ShouldBind", Accessor::Bind(BindTarget::Body)),
    ("Bind", Accessor::Bind(BindTarget::Body)),
    ("ShouldBindBodyWith", Accessor::Bind(BindTarget::Body)),
    ("ShouldBindWith", Accessor::BindWith),
    ("ShouldBindUri", Accessor::Bind(BindTarget::Uri)),
    ("BindUri", Accessor::Bind(BindTarget::Uri)),
    ("ShouldBindQuery", Accessor::Bind(BindTarget::Query)),
    ("BindQuery", Accessor::Bind(BindTarget::Query)),
    ("ShouldBindHeader", Accessor::Bind(BindTarget::Header)),
    ("BindHeader", Accessor::Bind(BindTarget::Header)),
];

/// Infers the inputs a handler reads through its context parameters.
///
/// Returns an empty list when the handler has no body or no context-typed
/// parameter. Results are unique by `(location, external_name)`, first
/// occurrence kept.
pub fn infer_bindings(
    handler: &ResolvedHandler,
    classifier: &mut ParameterClassifier,
    file: &ParsedFile,
) -> Vec<ParameterDescriptor> {
    let Some(body) = handler.body else {
        return Vec::new();
    };

    let context_vars: Vec<&str> = handler
        .parameters
        .iter()
        .filter(|p| classifier.is_context_type(&p.type_name))
        .map(|p| p.name.as_str())
        .collect();
    if context_vars.is_empty() {
        return Vec::new();
    }

    let mut bindings = Vec::new();
    let mut seen = HashSet::new();

    for call in named_descendants(body)
        .into_iter()
        .filter(|n| n.kind() == "call_expression")
    {
        let Some((method, args)) = context_call(call, &context_vars, file) else {
            continue;
        };
        let Some((_, accessor)) = ACCESSORS.iter().find(|(name, _)| *name == method) else {
            continue;
        };

        let descriptor = match *accessor {
            Accessor::Value {
                location,
                type_name,
            } => args
                .first()
                .and_then(|arg| string_literal(*arg, file))
                .map(|name| ParameterDescriptor {
                    name: name.clone(),
                    type_name: type_name.to_string(),
                    location,
                    required: location == ParameterLocation::Path,
                    external_name: name,
                    sub_parameters: Vec::new(),
                }),
            Accessor::Bind(target) => bind(args.first().copied(), target, body, classifier, file),
            Accessor::BindWith => {
                let target = args
                    .get(1)
                    .map(|arg| binding_engine_target(*arg, file))
                    .unwrap_or(BindTarget::Body);
                bind(args.first().copied(), target, body, classifier, file)
            }
        };

        let Some(descriptor) = descriptor else {
            debug!(
                "Could not infer input from {} call in {}",
                method, handler.name
            );
            continue;
        };

        if seen.insert((descriptor.location, descriptor.external_name.clone())) {
            debug!(
                "Handler {} reads {:?} input {}",
                handler.name, descriptor.location, descriptor.external_name
            );
            bindings.push(descriptor);
        }
    }

    bindings
}

/// Method name and arguments of a call on one of the context variables.
fn context_call<'t>(
    call: Node<'t>,
    context_vars: &[&str],
    file: &'t ParsedFile,
) -> Option<(&'t str, Vec<Node<'t>>)> {
    let function = call.child_by_field_name("function")?;
    if function.kind() != "selector_expression" {
        return None;
    }
    let operand = function.child_by_field_name("operand")?;
    let receiver = file.node_text(operand);
    if operand.kind() != "identifier" || !context_vars.iter().any(|v| *v == receiver) {
        return None;
    }
    let method = file.node_text(function.child_by_field_name("field")?);

    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let args = arguments
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();
    Some((method, args))
}

fn string_literal(node: Node, file: &ParsedFile) -> Option<String> {
    match node.kind() {
        "interpreted_string_literal" | "raw_string_literal" => {
            Some(unquote(file.node_text(node)).to_string())
        }
        _ => None,
    }
}

/// Target implied by the engine argument of `ShouldBindWith`.
fn binding_engine_target(node: Node, file: &ParsedFile) -> BindTarget {
    let engine = match node.kind() {
        "selector_expression" => node
            .child_by_field_name("field")
            .map(|f| file.node_text(f))
            .unwrap_or_default(),
        _ => file.node_text(node),
    };
    match engine {
        "Uri" => BindTarget::Uri,
        "Query" | "Form" => BindTarget::Query,
        "Header" => BindTarget::Header,
        _ => BindTarget::Body,
    }
}

/// Classifies the variable bound by a `Bind*` call.
fn bind(
    arg: Option<Node>,
    target: BindTarget,
    body: Node,
    classifier: &mut ParameterClassifier,
    file: &ParsedFile,
) -> Option<ParameterDescriptor> {
    let arg = arg?;
    let variable = match arg.kind() {
        "unary_expression" => arg.child_by_field_name("operand")?,
        "identifier" => arg,
        _ => return None,
    };
    if variable.kind() != "identifier" {
        return None;
    }
    let name = file.node_text(variable);

    let (type_name, type_node) = local_type(name, body, file)?;
    let mut descriptor = classifier.classify(name, &type_name, type_node);

    match target {
        BindTarget::Body => descriptor.location = ParameterLocation::Body,
        BindTarget::Uri => descriptor.location = ParameterLocation::Path,
        BindTarget::Header => descriptor.location = ParameterLocation::Header,
        BindTarget::Query => {
            descriptor.location = ParameterLocation::Query;
            for field in &mut descriptor.sub_parameters {
                if field.location == ParameterLocation::Form {
                    field.location = ParameterLocation::Query;
                }
            }
        }
    }

    Some(descriptor)
}

/// Declared type of a local variable, from the first declaration in the body.
fn local_type<'t>(
    variable: &str,
    body: Node<'t>,
    file: &'t ParsedFile,
) -> Option<(String, Option<Node<'t>>)> {
    named_descendants(body)
        .into_iter()
        .find_map(|node| match node.kind() {
            "var_spec" => {
                let mut cursor = node.walk();
                let index = node
                    .children_by_field_name("name", &mut cursor)
                    .position(|n| file.node_text(n) == variable)?;
                if let Some(declared) = node.child_by_field_name("type") {
                    return Some((type_text(declared, file), Some(declared)));
                }
                let values = node.child_by_field_name("value")?;
                literal_type(nth_named(values, index)?, file)
            }
            "short_var_declaration" => {
                let left = node.child_by_field_name("left")?;
                let mut cursor = left.walk();
                let index = left
                    .named_children(&mut cursor)
                    .position(|n| file.node_text(n) == variable)?;
                let right = node.child_by_field_name("right")?;
                literal_type(nth_named(right, index)?, file)
            }
            _ => None,
        })
}

fn nth_named(list: Node, index: usize) -> Option<Node> {
    let mut cursor = list.walk();
    let nth = list.named_children(&mut cursor).nth(index);
    nth
}

/// Type of `T{}`, `&T{}` or `new(T)`.
fn literal_type<'t>(value: Node<'t>, file: &'t ParsedFile) -> Option<(String, Option<Node<'t>>)> {
    match value.kind() {
        "unary_expression" => literal_type(value.child_by_field_name("operand")?, file),
        "composite_literal" => {
            let declared = value.child_by_field_name("type")?;
            Some((type_text(declared, file), Some(declared)))
        }
        "call_expression" => {
            let function = value.child_by_field_name("function")?;
            if file.node_text(function) != "new" {
                return None;
            }
            let arguments = value.child_by_field_name("arguments")?;
            let declared = arguments.named_child(0)?;
            Some((type_text(declared, file), Some(declared)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::GinImport;
    use crate::handler_resolver::HandlerResolver;
    use crate::parser::GoParser;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn parse_code(code: &str) -> ParsedFile {
        let mut parser = GoParser::new().unwrap();
        parser
            .parse_source(Path::new("handlers.go"), code.as_bytes().to_vec())
            .unwrap()
    }

    fn bindings_of(code: &str, handler: &str) -> Vec<ParameterDescriptor> {
        let parsed = parse_code(code);
        let resolved = HandlerResolver::new().resolve(handler, &parsed).unwrap();
        let mut classifier =
            ParameterClassifier::new(&parsed, GinImport::Qualified("gin".to_string()));
        infer_bindings(&resolved, &mut classifier, &parsed)
    }

    fn summary(bindings: &[ParameterDescriptor]) -> Vec<(ParameterLocation, &str, bool)> {
        bindings
            .iter()
            .map(|b| (b.location, b.external_name.as_str(), b.required))
            .collect()
    }

    #[test]
    fn test_value_accessors() {
        let code = r#"
package main

func GetUser(c *gin.Context) {
    id := c.Param("id")
    page := c.DefaultQuery("page", "1")
    tags := c.QueryArray("tag")
    token := c.GetHeader("Authorization")
    note := c.PostForm("note")
    other := c.Query("page")
    _, _, _, _, _, _ = id, page, tags, token, note, other
}
"#;
        let bindings = bindings_of(code, "GetUser");

        assert_eq!(
            summary(&bindings),
            vec![
                (ParameterLocation::Path, "id", true),
                (ParameterLocation::Query, "page", false),
                (ParameterLocation::Query, "tag", false),
                (ParameterLocation::Header, "Authorization", false),
                (ParameterLocation::Form, "note", false),
            ]
        );
        assert_eq!(bindings[2].type_name, "[]string");
        assert_eq!(bindings[0].type_name, "string");
    }

    #[test]
    fn test_json_binding_expands_struct() {
        let code = r#"
package main

type CreateUserRequest struct {
    Name  string `json:"name" binding:"required"`
    Email string `json:"email"`
}

func CreateUser(c *gin.Context) {
    var req CreateUserRequest
    if err := c.ShouldBindJSON(&req); err != nil {
        return
    }
}
"#;
        let bindings = bindings_of(code, "CreateUser");

        assert_eq!(bindings.len(), 1);
        let body = &bindings[0];
        assert_eq!(body.name, "req");
        assert_eq!(body.type_name, "CreateUserRequest");
        assert_eq!(body.location, ParameterLocation::Body);
        assert!(body.required);
        assert_eq!(body.sub_parameters.len(), 2);
    }

    #[test]
    fn test_query_and_uri_binding() {
        let code = r#"
package main

type ListFilter struct {
    Page int    `form:"page"`
    Sort string `form:"sort"`
}

type UserURI struct {
    ID string `uri:"id" binding:"required"`
}

func (h *UserHandler) List(ctx *gin.Context) {
    filter := &ListFilter{}
    uri := UserURI{}
    _ = ctx.ShouldBindQuery(filter)
    _ = ctx.ShouldBindUri(&uri)
}
"#;
        let bindings = bindings_of(code, "h.List");

        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].location, ParameterLocation::Query);
        assert!(bindings[0]
            .sub_parameters
            .iter()
            .all(|f| f.location == ParameterLocation::Query));

        assert_eq!(bindings[1].location, ParameterLocation::Path);
        assert_eq!(bindings[1].sub_parameters[0].external_name, "id");
        assert_eq!(
            bindings[1].sub_parameters[0].location,
            ParameterLocation::Path
        );
    }

    #[test]
    fn test_should_bind_with_engine() {
        let code = r#"
package main

type Filter struct {
    Q string `form:"q"`
}

func Search(c *gin.Context) {
    f := new(Filter)
    c.ShouldBindWith(f, binding.Query)
}
"#;
        let bindings = bindings_of(code, "Search");
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].location, ParameterLocation::Query);
        assert_eq!(bindings[0].sub_parameters[0].location, ParameterLocation::Query);
    }

    #[test]
    fn test_inline_struct_binding() {
        let code = r#"
package main

func Login(c *gin.Context) {
    var body struct {
        User string `json:"user" binding:"required"`
    }
    c.BindJSON(&body)
}
"#;
        let bindings = bindings_of(code, "Login");
        assert_eq!(bindings[0].type_name, "struct{}");
        assert_eq!(bindings[0].sub_parameters[0].external_name, "user");
        assert!(bindings[0].required);
    }

    #[test]
    fn test_calls_on_other_receivers_are_ignored() {
        let code = r#"
package main

func Ping(c *gin.Context) {
    values := url.Values{}
    values.Query("x")
    c.JSON(200, gin.H{"ok": true})
}
"#;
        assert!(bindings_of(code, "Ping").is_empty());
    }

    #[test]
    fn test_handler_without_context() {
        let code = "package main\nfunc Health(id int) { _ = id }\n";
        assert!(bindings_of(code, "Health").is_empty());
    }

    #[test]
    fn test_unknown_bound_variable_is_skipped() {
        let code = r#"
package main

func Update(c *gin.Context, req *UpdateRequest) {
    c.ShouldBindJSON(req)
}
"#;
        assert!(bindings_of(code, "Update").is_empty());
    }
}
