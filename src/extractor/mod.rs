//! Route extraction module for Go routing-library registration calls.
//!
//! This module provides the data model shared by route extractors and the
//! [`RouteExtractor`] trait. Each routing library has its own extractor that
//! knows its registration convention.
//!
//! # Supported Routers
//!
//! - **Gin**: See [`gin::GinExtractor`]
//!
//! # Example
//!
//! ```no_run
//! use go_openapi_from_source::extractor::{RouteExtractor, gin::GinExtractor};
//! use go_openapi_from_source::parser::GoParser;
//! use std::path::Path;
//!
//! let mut parser = GoParser::new().unwrap();
//! let parsed = parser.parse_file(Path::new("main.go")).unwrap();
//! let routes = GinExtractor.extract_routes(&parsed);
//! println!("Found {} routes", routes.len());
//! ```

pub mod gin;

use crate::parser::ParsedFile;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tree_sitter::Node;

/// Trait for extracting route registrations from a parsed Go file.
pub trait RouteExtractor {
    /// Classifies a single call expression node.
    fn classify_call(&self, call: Node, parsed: &ParsedFile) -> Extraction;

    /// Extracts every recognized route from the file, in document order.
    fn extract_routes(&self, parsed: &ParsedFile) -> Vec<RouteDescriptor> {
        crate::parser::named_descendants(parsed.root())
            .into_iter()
            .filter(|node| node.kind() == "call_expression")
            .filter_map(|call| match self.classify_call(call, parsed) {
                Extraction::Recognized(route) => Some(route),
                Extraction::NotARoute(_) => None,
            })
            .collect()
    }
}

/// Outcome of inspecting one call expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The call registers a route
    Recognized(RouteDescriptor),
    /// The call is not a route registration
    NotARoute(NotARoute),
}

/// Why a call expression was not treated as a route registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotARoute {
    /// The callee is not of the form `receiver.Method`
    NotASelectorCall,
    /// The method name is not one of the HTTP verbs
    UnknownVerb,
    /// Fewer than two arguments (path and handler) were passed
    TooFewArguments,
    /// The first argument is neither a string literal nor an identifier
    NonLiteralPath,
}

/// A single recognized route registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// The HTTP method this route answers
    pub method: HttpMethod,
    /// URL template with placeholders normalized to `{name}`
    pub url_template: String,
    /// Handler reference as written at the registration site (e.g. `h.GetUser`)
    pub handler_reference: String,
    /// Syntactic shape of the handler argument
    pub handler_kind: HandlerKind,
    /// File containing the registration call
    pub source_file: PathBuf,
    /// 1-based line of the registration call
    pub source_line: usize,
}

/// HTTP methods recognized as route registration verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    /// Gin's `Any`, registering the handler for every verb
    Any,
}

impl HttpMethod {
    /// Every concrete verb, in the order `Any` expands to.
    pub const CONCRETE: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Parses a verb name case-insensitively.
    pub fn from_verb(verb: &str) -> Option<Self> {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            "ANY" => Some(HttpMethod::Any),
            _ => None,
        }
    }

    /// Upper-case verb name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactic shape of a handler argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// A bare identifier naming a free function
    Function,
    /// A selector such as `h.GetUser`
    Method,
    /// An inline function literal
    Anonymous,
    /// Anything else
    Unknown,
}

static PATH_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r":(\w+)").expect("valid regex"));

/// Rewrites every `:name` segment of a Gin path to the `{name}` form.
pub fn convert_path_template(path: &str) -> String {
    PATH_PARAM.replace_all(path, "{$1}").into_owned()
}

/// Placeholder names of a normalized URL template, in order.
pub fn template_placeholders(template: &str) -> Vec<String> {
    template
        .split('/')
        .filter_map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
        })
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
        .collect()
}
