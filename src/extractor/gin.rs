use crate::extractor::{
    convert_path_template, Extraction, HandlerKind, HttpMethod, NotARoute, RouteDescriptor,
    RouteExtractor,
};
use crate::parser::ParsedFile;
use log::{debug, trace};
use tree_sitter::Node;

/// Gin route extractor
///
/// Recognizes the `receiver.VERB(path, handler, ...)` registration
/// convention. The receiver is not checked against a router type, so
/// `*gin.Engine`, `*gin.RouterGroup` and any wrapper exposing the same verb
/// methods all match.
pub struct GinExtractor;

impl RouteExtractor for GinExtractor {
    fn classify_call(&self, call: Node, parsed: &ParsedFile) -> Extraction {
        let Some(function) = call.child_by_field_name("function") else {
            return Extraction::NotARoute(NotARoute::NotASelectorCall);
        };
        if function.kind() != "selector_expression" {
            return Extraction::NotARoute(NotARoute::NotASelectorCall);
        }

        let Some(verb) = function.child_by_field_name("field") else {
            return Extraction::NotARoute(NotARoute::NotASelectorCall);
        };
        let Some(method) = HttpMethod::from_verb(parsed.node_text(verb)) else {
            return Extraction::NotARoute(NotARoute::UnknownVerb);
        };

        let args = call_arguments(call);
        if args.len() < 2 {
            trace!(
                "{}:{}: {} call with {} argument(s) skipped",
                parsed.path.display(),
                call.start_position().row + 1,
                method,
                args.len()
            );
            return Extraction::NotARoute(NotARoute::TooFewArguments);
        }

        let Some(raw_path) = literal_path(args[0], parsed) else {
            return Extraction::NotARoute(NotARoute::NonLiteralPath);
        };

        let (handler_reference, handler_kind) = handler_reference(args[1], parsed);
        let route = RouteDescriptor {
            method,
            url_template: convert_path_template(&raw_path),
            handler_reference,
            handler_kind,
            source_file: parsed.path.clone(),
            source_line: call.start_position().row + 1,
        };

        debug!(
            "Found route {} {} -> {} ({}:{})",
            route.method,
            route.url_template,
            route.handler_reference,
            parsed.path.display(),
            route.source_line
        );

        Extraction::Recognized(route)
    }
}

/// Argument expressions of a call, comments excluded.
fn call_arguments(call: Node) -> Vec<Node> {
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

/// Path text of a registration's first argument.
///
/// String literals lose their quotes; a bare identifier is taken verbatim as
/// the path text.
fn literal_path(node: Node, parsed: &ParsedFile) -> Option<String> {
    match node.kind() {
        "interpreted_string_literal" | "raw_string_literal" => {
            Some(unquote(parsed.node_text(node)).to_string())
        }
        "identifier" => Some(parsed.node_text(node).to_string()),
        _ => None,
    }
}

/// Strips one pair of surrounding `"` or `` ` `` quotes.
pub(crate) fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'`' && last == b'`') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Textual reference and kind of a handler expression.
///
/// Qualifier chains are rebuilt segment by segment; a call is unwrapped to
/// its callee so `mw(h.Get)` yields `mw` and `h.Wrap(x)` yields `h.Wrap`.
fn handler_reference(node: Node, parsed: &ParsedFile) -> (String, HandlerKind) {
    match node.kind() {
        "identifier" => (parsed.node_text(node).to_string(), HandlerKind::Function),
        "selector_expression" => {
            let operand = node
                .child_by_field_name("operand")
                .map(|operand| handler_reference(operand, parsed).0)
                .unwrap_or_else(|| "unknown".to_string());
            let field = node
                .child_by_field_name("field")
                .map(|field| parsed.node_text(field))
                .unwrap_or("unknown");
            (format!("{}.{}", operand, field), HandlerKind::Method)
        }
        "call_expression" => match node.child_by_field_name("function") {
            Some(callee) => handler_reference(callee, parsed),
            None => ("unknown".to_string(), HandlerKind::Unknown),
        },
        "func_literal" => ("anonymous".to_string(), HandlerKind::Anonymous),
        _ => ("unknown".to_string(), HandlerKind::Unknown),
    }
}
