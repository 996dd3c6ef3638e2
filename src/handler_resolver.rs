use crate::classifier::ParameterDescriptor;
use crate::parser::{named_descendants, ParsedFile};
use crate::type_resolver::type_text;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tree_sitter::Node;

/// Fully classified description of a route's handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerDescriptor {
    /// Function or method name
    pub name: String,
    /// Receiver type for methods, package name for free functions
    pub declaring_scope: String,
    pub source_file: PathBuf,
    /// Declared parameters, in declaration order
    pub parameters: Vec<ParameterDescriptor>,
    /// Inputs read through the request context inside the handler body
    pub body_bindings: Vec<ParameterDescriptor>,
    /// Type of the first result, if the handler returns anything
    pub primary_return_type: Option<String>,
    pub has_error_return: bool,
}

/// A located handler declaration, before parameter classification.
#[derive(Debug, Clone)]
pub struct ResolvedHandler<'t> {
    pub name: String,
    pub declaring_scope: String,
    pub source_file: PathBuf,
    pub parameters: Vec<RawParameter<'t>>,
    pub primary_return_type: Option<String>,
    pub has_error_return: bool,
    /// The function body block, absent for external declarations
    pub body: Option<Node<'t>>,
}

/// A declared parameter with its canonical type text.
#[derive(Debug, Clone)]
pub struct RawParameter<'t> {
    pub name: String,
    pub type_name: String,
    pub type_node: Option<Node<'t>>,
}

/// Maps a receiver variable used at a registration site to a type name.
pub trait ReceiverTypeStrategy {
    /// Returns the declared type of `variable`, without pointer markers.
    fn resolve_receiver(&self, variable: &str, file: &ParsedFile) -> Option<String>;
}

/// Receiver inference from same-file evidence and naming conventions.
///
/// Tried in order, first hit wins:
/// 1. a construction or declaration site of the variable anywhere in the
///    file (`v := &T{}`, `v := T{}`, `var v = &T{}`, `var v T`,
///    `v := NewT()`, `v := pkg.NewT()`);
/// 2. a function parameter `v *T` (method receivers never count);
/// 3. a fixed table of conventional names;
/// 4. the variable name with its first letter capitalized.
#[derive(Debug, Default, Clone)]
pub struct HeuristicReceiverStrategy;

/// Conventional receiver variable names.
const NAME_TABLE: &[(&str, &str)] = &[
    ("handler", "UserHandler"),
    ("h", "UserHandler"),
    ("userHandler", "UserHandler"),
    ("productHandler", "ProductHandler"),
];

impl ReceiverTypeStrategy for HeuristicReceiverStrategy {
    fn resolve_receiver(&self, variable: &str, file: &ParsedFile) -> Option<String> {
        if let Some(type_name) = construction_site_type(variable, file) {
            debug!("Receiver {} typed {} from construction site", variable, type_name);
            return Some(type_name);
        }

        if let Some(type_name) = parameter_type(variable, file) {
            debug!("Receiver {} typed {} from parameter declaration", variable, type_name);
            return Some(type_name);
        }

        if let Some((_, type_name)) = NAME_TABLE.iter().find(|(name, _)| *name == variable) {
            debug!("Receiver {} typed {} from name table", variable, type_name);
            return Some(type_name.to_string());
        }

        let mut chars = variable.chars();
        let first = chars.next()?;
        Some(first.to_uppercase().chain(chars).collect())
    }
}

/// Type of the first same-file statement that declares or constructs `variable`.
fn construction_site_type(variable: &str, file: &ParsedFile) -> Option<String> {
    named_descendants(file.root())
        .into_iter()
        .find_map(|node| match node.kind() {
            "short_var_declaration" | "assignment_statement" => {
                let left = node.child_by_field_name("left")?;
                let right = node.child_by_field_name("right")?;
                let index = position_of(variable, left, file)?;
                let value = nth_named(right, index)?;
                constructed_type(value, file)
            }
            "var_spec" => {
                let mut cursor = node.walk();
                let names: Vec<&str> = node
                    .children_by_field_name("name", &mut cursor)
                    .map(|n| file.node_text(n))
                    .collect();
                let index = names.iter().position(|name| *name == variable)?;
                if let Some(declared) = node.child_by_field_name("type") {
                    return Some(bare_type(declared, file));
                }
                let value = nth_named(node.child_by_field_name("value")?, index)?;
                constructed_type(value, file)
            }
            _ => None,
        })
}

/// Declared type of a non-receiver parameter named `variable`.
fn parameter_type(variable: &str, file: &ParsedFile) -> Option<String> {
    named_descendants(file.root())
        .into_iter()
        .filter(|node| node.kind() == "parameter_declaration" && !is_receiver(*node))
        .find_map(|node| {
            let mut cursor = node.walk();
            let declares = node
                .children_by_field_name("name", &mut cursor)
                .any(|n| file.node_text(n) == variable);
            if !declares {
                return None;
            }
            node.child_by_field_name("type")
                .map(|declared| bare_type(declared, file))
        })
}

fn is_receiver(parameter: Node) -> bool {
    let Some(list) = parameter.parent() else {
        return false;
    };
    list.parent()
        .filter(|owner| owner.kind() == "method_declaration")
        .and_then(|owner| owner.child_by_field_name("receiver"))
        .is_some_and(|receiver| receiver.id() == list.id())
}

fn position_of(variable: &str, list: Node, file: &ParsedFile) -> Option<usize> {
    let mut cursor = list.walk();
    let position = list
        .named_children(&mut cursor)
        .position(|n| n.kind() == "identifier" && file.node_text(n) == variable);
    position
}

fn nth_named(list: Node, index: usize) -> Option<Node> {
    let mut cursor = list.walk();
    let nth = list.named_children(&mut cursor).nth(index);
    nth
}

/// Type built by `&T{}`, `T{}`, `NewT(...)` or `pkg.NewT(...)`.
fn constructed_type(value: Node, file: &ParsedFile) -> Option<String> {
    match value.kind() {
        "unary_expression" => {
            let operator = value.child_by_field_name("operator")?;
            if file.node_text(operator) != "&" {
                return None;
            }
            constructed_type(value.child_by_field_name("operand")?, file)
        }
        "composite_literal" => value
            .child_by_field_name("type")
            .map(|t| bare_type(t, file)),
        "call_expression" => {
            let function = value.child_by_field_name("function")?;
            let callee = match function.kind() {
                "identifier" => function,
                "selector_expression" => function.child_by_field_name("field")?,
                _ => return None,
            };
            file.node_text(callee)
                .strip_prefix("New")
                .filter(|rest| !rest.is_empty())
                .map(|rest| rest.to_string())
        }
        _ => None,
    }
}

fn bare_type(node: Node, file: &ParsedFile) -> String {
    type_text(node, file).trim_start_matches('*').to_string()
}

/// Handler resolver - locates handler declarations in the registering file
pub struct HandlerResolver {
    strategy: Box<dyn ReceiverTypeStrategy>,
}

impl Default for HandlerResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerResolver {
    /// Create a resolver using [`HeuristicReceiverStrategy`]
    pub fn new() -> Self {
        Self::with_strategy(Box::new(HeuristicReceiverStrategy))
    }

    /// Create a resolver with a custom receiver inference strategy
    pub fn with_strategy(strategy: Box<dyn ReceiverTypeStrategy>) -> Self {
        Self { strategy }
    }

    /// Resolve a handler reference against the file that registered it.
    ///
    /// Returns `None` for anonymous or unknown handlers, references with
    /// more than one qualifier, and references with no matching declaration.
    pub fn resolve<'t>(&self, reference: &str, file: &'t ParsedFile) -> Option<ResolvedHandler<'t>> {
        let parts: Vec<&str> = reference.split('.').collect();

        let found = match parts.as_slice() {
            ["anonymous"] | ["unknown"] => None,
            [function] => find_function(function, file),
            [variable, method] => {
                let type_name = self.strategy.resolve_receiver(variable, file)?;
                find_method(&type_name, method, file)
            }
            _ => {
                debug!("Handler reference {} has too many qualifiers", reference);
                None
            }
        };

        let Some((declaration, declaring_scope)) = found else {
            debug!(
                "No declaration for handler {} in {}",
                reference,
                file.path.display()
            );
            return None;
        };

        Some(describe_declaration(declaration, declaring_scope, file))
    }
}

fn find_function<'t>(name: &str, file: &'t ParsedFile) -> Option<(Node<'t>, String)> {
    let root = file.root();
    let mut cursor = root.walk();
    let declaration = root.named_children(&mut cursor).find(|node| {
        node.kind() == "function_declaration"
            && node
                .child_by_field_name("name")
                .is_some_and(|n| file.node_text(n) == name)
    })?;
    let scope = file.package_name().unwrap_or_default().to_string();
    Some((declaration, scope))
}

fn find_method<'t>(
    type_name: &str,
    method: &str,
    file: &'t ParsedFile,
) -> Option<(Node<'t>, String)> {
    let root = file.root();
    let mut cursor = root.walk();
    let declaration = root.named_children(&mut cursor).find(|node| {
        node.kind() == "method_declaration"
            && node
                .child_by_field_name("name")
                .is_some_and(|n| file.node_text(n) == method)
            && receiver_type(*node, file).as_deref() == Some(type_name)
    })?;
    Some((declaration, type_name.to_string()))
}

/// Receiver type name of a method declaration, pointer stripped.
fn receiver_type(method: Node, file: &ParsedFile) -> Option<String> {
    let receiver = method.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    let declaration = receiver
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;
    let type_node = declaration.child_by_field_name("type")?;
    Some(bare_type(type_node, file))
}

fn describe_declaration<'t>(
    declaration: Node<'t>,
    declaring_scope: String,
    file: &'t ParsedFile,
) -> ResolvedHandler<'t> {
    let name = declaration
        .child_by_field_name("name")
        .map(|n| file.node_text(n).to_string())
        .unwrap_or_default();

    let parameters = declaration
        .child_by_field_name("parameters")
        .map(|list| declared_parameters(list, file))
        .unwrap_or_default();

    let result_types = declaration
        .child_by_field_name("result")
        .map(|result| result_types(result, file))
        .unwrap_or_default();

    debug!(
        "Resolved handler {}.{} with {} parameter(s)",
        declaring_scope,
        name,
        parameters.len()
    );

    ResolvedHandler {
        name,
        declaring_scope,
        source_file: file.path.clone(),
        parameters,
        primary_return_type: result_types.first().cloned(),
        has_error_return: result_types.iter().any(|t| t == "error"),
        body: declaration.child_by_field_name("body"),
    }
}

fn declared_parameters<'t>(list: Node<'t>, file: &'t ParsedFile) -> Vec<RawParameter<'t>> {
    let mut parameters = Vec::new();
    let mut cursor = list.walk();

    for declaration in list.named_children(&mut cursor) {
        let variadic = match declaration.kind() {
            "parameter_declaration" => false,
            "variadic_parameter_declaration" => true,
            _ => continue,
        };

        let type_node = declaration.child_by_field_name("type");
        let mut type_name = type_node
            .map(|t| type_text(t, file))
            .unwrap_or_else(|| "unknown".to_string());
        if variadic {
            type_name = format!("[]{}", type_name);
        }

        let mut name_cursor = declaration.walk();
        let names: Vec<String> = declaration
            .children_by_field_name("name", &mut name_cursor)
            .map(|n| file.node_text(n).to_string())
            .collect();

        if names.is_empty() {
            parameters.push(RawParameter {
                name: format!("arg{}", parameters.len()),
                type_name,
                type_node,
            });
            continue;
        }

        for name in names {
            parameters.push(RawParameter {
                name,
                type_name: type_name.clone(),
                type_node,
            });
        }
    }

    parameters
}

/// Result types in order; a named group `(a, b int)` contributes once per name.
fn result_types(result: Node, file: &ParsedFile) -> Vec<String> {
    if result.kind() != "parameter_list" {
        return vec![type_text(result, file)];
    }

    let mut types = Vec::new();
    let mut cursor = result.walk();
    for declaration in result
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "parameter_declaration")
    {
        let Some(type_node) = declaration.child_by_field_name("type") else {
            continue;
        };
        let type_name = type_text(type_node, file);
        let mut name_cursor = declaration.walk();
        let count = declaration
            .children_by_field_name("name", &mut name_cursor)
            .count()
            .max(1);
        types.extend(std::iter::repeat(type_name).take(count));
    }
    types
}
