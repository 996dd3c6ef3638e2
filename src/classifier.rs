use crate::detector::GinImport;
use crate::parser::ParsedFile;
use crate::struct_tag::StructTag;
use crate::type_resolver::{
    strip_pointer, struct_from_node, FieldDef, StructDef, StructLookup, TypeResolver,
};
use log::debug;
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

/// Where a request value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// The framework request context; never surfaced
    Context,
    Path,
    Query,
    Header,
    Body,
    Form,
    /// A struct field with no location tag; kept for required bookkeeping
    Unclassified,
}

impl ParameterLocation {
    /// Whether parameters at this location appear in generated documents.
    pub fn is_visible(&self) -> bool {
        !matches!(self, ParameterLocation::Context | ParameterLocation::Unclassified)
    }
}

/// A classified handler parameter or struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Declared name (parameter or field name)
    pub name: String,
    /// Canonical Go type text
    pub type_name: String,
    pub location: ParameterLocation,
    pub required: bool,
    /// Name the value has on the wire (tag name, or the declared name)
    pub external_name: String,
    /// Expanded fields, non-empty only for composite types whose declaration was found
    pub sub_parameters: Vec<ParameterDescriptor>,
}

/// Maps a struct tag key to the location it implies.
#[derive(Debug, Clone, Copy)]
pub struct LocationRule {
    pub key: &'static str,
    pub location: ParameterLocation,
}

/// Field location rules in priority order; the first rule whose key carries
/// a usable value wins.
pub const LOCATION_RULES: &[LocationRule] = &[
    LocationRule {
        key: "uri",
        location: ParameterLocation::Path,
    },
    LocationRule {
        key: "form",
        location: ParameterLocation::Form,
    },
    LocationRule {
        key: "header",
        location: ParameterLocation::Header,
    },
    LocationRule {
        key: "query",
        location: ParameterLocation::Query,
    },
    LocationRule {
        key: "json",
        location: ParameterLocation::Body,
    },
];

/// Tag keys consulted for the `required` token, in order.
const REQUIRED_KEYS: &[&str] = &["validate", "binding"];

/// First matching location rule for a tag.
///
/// A rule matches when its key is present with a value that is neither empty
/// nor the `-` skip marker.
pub fn match_location_rule(tag: &StructTag) -> Option<&'static LocationRule> {
    LOCATION_RULES
        .iter()
        .find(|rule| tag.get(rule.key).is_some_and(|v| !v.is_empty() && v != "-"))
}

/// How a basic-typed parameter name is matched.
#[derive(Debug, Clone, Copy)]
pub enum NamePattern {
    /// Case-insensitive whole-name match
    Exact(&'static str),
    /// Case-sensitive suffix match
    Suffix(&'static str),
}

impl NamePattern {
    fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Exact(expected) => name.eq_ignore_ascii_case(expected),
            NamePattern::Suffix(suffix) => name.len() > suffix.len() && name.ends_with(suffix),
        }
    }
}

/// Name heuristic entry for basic-typed top-level parameters.
#[derive(Debug, Clone, Copy)]
pub struct NameRule {
    pub pattern: NamePattern,
    pub location: ParameterLocation,
    pub required: bool,
}

const fn identity(pattern: NamePattern) -> NameRule {
    NameRule {
        pattern,
        location: ParameterLocation::Path,
        required: true,
    }
}

const fn paging(name: &'static str) -> NameRule {
    NameRule {
        pattern: NamePattern::Exact(name),
        location: ParameterLocation::Query,
        required: false,
    }
}

/// Basic-typed parameter names, in priority order. Unmatched names default
/// to an optional query parameter.
pub const BASIC_NAME_RULES: &[NameRule] = &[
    identity(NamePattern::Exact("id")),
    identity(NamePattern::Suffix("Id")),
    identity(NamePattern::Suffix("ID")),
    identity(NamePattern::Suffix("_id")),
    identity(NamePattern::Exact("userid")),
    identity(NamePattern::Exact("productid")),
    paging("limit"),
    paging("offset"),
    paging("page"),
    paging("page_size"),
    paging("pagesize"),
    paging("per_page"),
    paging("sort"),
    paging("order"),
    paging("order_by"),
];

const BASIC_TYPES: &[&str] = &[
    "string", "bool", "byte", "rune", "int", "int8", "int16", "int32", "int64", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr", "float32", "float64", "time.Time",
];

/// Nesting limit for struct expansion.
const MAX_EXPANSION_DEPTH: usize = 8;

/// Whether a type name is a basic (scalar) type, pointers included.
pub fn is_basic_type(type_name: &str) -> bool {
    BASIC_TYPES.contains(&type_name.trim_start_matches('*'))
}

/// Whether a type name denotes a slice, array or map.
pub fn is_collection_type(type_name: &str) -> bool {
    let name = type_name.trim_start_matches('*');
    name.starts_with("[]") || name.starts_with("map[")
}

/// Parameter classifier for one source file.
///
/// Struct declarations are looked up in the file through a [`TypeResolver`];
/// the file's Gin import decides which qualified names denote the request
/// context.
pub struct ParameterClassifier<'f> {
    file: &'f ParsedFile,
    resolver: TypeResolver<'f>,
    gin: GinImport,
    /// Types currently being expanded, outermost first
    expanding: Vec<String>,
}

impl<'f> ParameterClassifier<'f> {
    pub fn new(file: &'f ParsedFile, gin: GinImport) -> Self {
        Self {
            file,
            resolver: TypeResolver::new(file),
            gin,
            expanding: Vec::new(),
        }
    }

    /// Whether the type is the framework request context.
    pub fn is_context_type(&self, type_name: &str) -> bool {
        let name = type_name.trim_start_matches('*');
        if matches!(name, "Context" | "gin.Context" | "context.Context") {
            return true;
        }
        match self.gin.qualifier() {
            Some(alias) => name
                .strip_suffix(".Context")
                .is_some_and(|qualifier| qualifier == alias),
            None => false,
        }
    }

    /// Classifies a top-level handler parameter.
    ///
    /// `type_node` is the declared type's syntax node when available; inline
    /// `struct{...}` types are expanded from it directly.
    pub fn classify(
        &mut self,
        name: &str,
        type_name: &str,
        type_node: Option<Node>,
    ) -> ParameterDescriptor {
        let mut descriptor = ParameterDescriptor {
            name: name.to_string(),
            type_name: type_name.to_string(),
            location: ParameterLocation::Query,
            required: false,
            external_name: name.to_string(),
            sub_parameters: Vec::new(),
        };

        if self.is_context_type(type_name) {
            descriptor.location = ParameterLocation::Context;
        } else if is_basic_type(type_name) {
            let rule = BASIC_NAME_RULES.iter().find(|rule| rule.pattern.matches(name));
            if let Some(rule) = rule {
                descriptor.location = rule.location;
                descriptor.required = rule.required;
            }
        } else if is_collection_type(type_name) {
            descriptor.location = ParameterLocation::Body;
        } else {
            descriptor.location = ParameterLocation::Body;
            descriptor.sub_parameters = self.expand(type_name, type_node);
            descriptor.required = descriptor.sub_parameters.iter().any(|p| p.required);
        }

        debug!(
            "Classified parameter {} {} as {:?} (required: {}, {} fields)",
            name,
            type_name,
            descriptor.location,
            descriptor.required,
            descriptor.sub_parameters.len()
        );
        descriptor
    }

    /// Expands a composite type into field descriptors.
    pub fn expand(&mut self, type_name: &str, type_node: Option<Node>) -> Vec<ParameterDescriptor> {
        match self.lookup(type_name, type_node) {
            Some(def) => self.expand_def(type_name, &def),
            None => Vec::new(),
        }
    }

    fn expand_def(&mut self, type_name: &str, def: &StructDef) -> Vec<ParameterDescriptor> {
        let key = type_name.trim_start_matches('*').to_string();
        let inline = key == "struct{}";
        if !inline && self.expanding.contains(&key) {
            debug!("Recursive type {} not expanded again", key);
            return Vec::new();
        }
        if self.expanding.len() >= MAX_EXPANSION_DEPTH {
            debug!("Expansion depth limit reached at {}", key);
            return Vec::new();
        }

        self.expanding.push(key);
        let fields = def
            .fields
            .iter()
            .filter(|field| field.is_exported())
            .map(|field| self.classify_field(field))
            .collect();
        self.expanding.pop();

        fields
    }

    fn lookup(&mut self, type_name: &str, type_node: Option<Node>) -> Option<StructDef> {
        if let Some(node) = type_node.map(strip_pointer).filter(|n| n.kind() == "struct_type") {
            return Some(struct_from_node("struct{}", node, self.file));
        }

        match self.resolver.find_struct(type_name) {
            StructLookup::Found(def) => Some(def),
            StructLookup::NotInFile => {
                debug!("No declaration for {} in file, fields not expanded", type_name);
                None
            }
            StructLookup::CrossFileUnsupported => {
                debug!(
                    "{} is declared in another package, fields not expanded",
                    type_name
                );
                None
            }
        }
    }

    /// Classifies one exported struct field from its tag.
    pub fn classify_field(&mut self, field: &FieldDef) -> ParameterDescriptor {
        let tag = StructTag::parse(field.tag.as_deref().unwrap_or(""));
        let rule = match_location_rule(&tag);
        let location = rule
            .map(|r| r.location)
            .unwrap_or(ParameterLocation::Unclassified);

        let tagged_name = rule
            .filter(|r| r.location != ParameterLocation::Body)
            .and_then(|r| tag.name(r.key))
            .filter(|n| !n.is_empty());
        let json_name = tag.name("json").filter(|n| !n.is_empty() && *n != "-");
        let external_name = tagged_name
            .or(json_name)
            .unwrap_or(field.name.as_str())
            .to_string();

        let required = REQUIRED_KEYS
            .iter()
            .any(|key| tag.has_option(key, "required"));

        let sub_parameters = if let Some(inline) = &field.inline_struct {
            self.expand_def(&field.type_name, inline)
        } else if is_basic_type(&field.type_name)
            || is_collection_type(&field.type_name)
            || self.is_context_type(&field.type_name)
        {
            Vec::new()
        } else {
            self.expand(&field.type_name, None)
        };

        ParameterDescriptor {
            name: field.name.clone(),
            type_name: field.type_name.clone(),
            location,
            required,
            external_name,
            sub_parameters,
        }
    }
}
