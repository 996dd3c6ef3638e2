use crate::extractor::gin::unquote;
use crate::parser::{named_descendants, ParsedFile};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

/// Type resolver - resolves Go struct declarations within a single file
///
/// Lookups are deliberately scoped to the file that registered the route.
/// Qualified names (`pkg.Type`) are never chased into other files or
/// packages; they resolve to [`StructLookup::CrossFileUnsupported`].
pub struct TypeResolver<'f> {
    /// The file whose declarations are searched
    file: &'f ParsedFile,
    /// Cache of lookups to avoid re-walking the tree
    cache: HashMap<String, StructLookup>,
    /// Track names currently being resolved to break alias cycles
    resolving_stack: HashSet<String>,
}

/// Outcome of a struct declaration lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructLookup {
    /// The declaration was found in the file
    Found(StructDef),
    /// No struct type with that name is declared in the file
    NotInFile,
    /// The name is package-qualified; resolving it needs other files
    CrossFileUnsupported,
}

/// Struct definition with fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    /// Declared type name, or `struct{}` for inline struct types
    pub name: String,
    /// Named fields in declaration order
    pub fields: Vec<FieldDef>,
}

/// Field definition in a struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Canonical type text (see [`type_text`])
    pub type_name: String,
    /// Tag literal with its quotes removed, if present
    pub tag: Option<String>,
    /// Fields of an inline `struct{...}` type (pointers included)
    pub inline_struct: Option<StructDef>,
}

impl FieldDef {
    /// Whether the field is exported (starts with an upper-case letter).
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(|c| c.is_uppercase())
    }
}

impl<'f> TypeResolver<'f> {
    /// Whether lookups can follow a type into another file or package.
    pub const CROSS_FILE_RESOLUTION: bool = false;

    /// Create a new TypeResolver over one parsed file
    pub fn new(file: &'f ParsedFile) -> Self {
        Self {
            file,
            cache: HashMap::new(),
            resolving_stack: HashSet::new(),
        }
    }

    /// Find a struct declaration by type name.
    ///
    /// Leading pointer markers are ignored. Named types declared as another
    /// same-file type (`type Admin User`, `type Admin = User`) resolve to the
    /// underlying struct.
    pub fn find_struct(&mut self, type_name: &str) -> StructLookup {
        let name = type_name.trim_start_matches('*');

        if name.contains('.') {
            debug!(
                "Struct {} is package-qualified, cross-file resolution unsupported",
                name
            );
            return StructLookup::CrossFileUnsupported;
        }

        if let Some(cached) = self.cache.get(name) {
            return cached.clone();
        }

        if !self.resolving_stack.insert(name.to_string()) {
            warn!("Circular type definition detected for: {}", name);
            return StructLookup::NotInFile;
        }

        let result = self.lookup_uncached(name);
        self.resolving_stack.remove(name);

        if result == StructLookup::NotInFile {
            debug!("Struct {} not found in {}", name, self.file.path.display());
        }
        self.cache.insert(name.to_string(), result.clone());
        result
    }

    fn lookup_uncached(&mut self, name: &str) -> StructLookup {
        let file = self.file;
        let spec = named_descendants(file.root()).into_iter().find(|node| {
            matches!(node.kind(), "type_spec" | "type_alias")
                && node
                    .child_by_field_name("name")
                    .is_some_and(|n| file.node_text(n) == name)
        });

        let Some(declared) = spec.and_then(|s| s.child_by_field_name("type")) else {
            return StructLookup::NotInFile;
        };

        match declared.kind() {
            "struct_type" => {
                debug!("Found struct {} in {}", name, file.path.display());
                StructLookup::Found(struct_from_node(name, declared, file))
            }
            "type_identifier" | "pointer_type" | "generic_type" | "qualified_type" => {
                let underlying = type_text(declared, file);
                match self.find_struct(&underlying) {
                    StructLookup::Found(def) => StructLookup::Found(StructDef {
                        name: name.to_string(),
                        fields: def.fields,
                    }),
                    other => other,
                }
            }
            _ => StructLookup::NotInFile,
        }
    }
}

/// Build a [`StructDef`] from a `struct_type` node.
///
/// Embedded fields carry no field name and are skipped.
pub fn struct_from_node(name: &str, struct_type: Node, file: &ParsedFile) -> StructDef {
    let mut fields = Vec::new();

    let mut cursor = struct_type.walk();
    let lists: Vec<Node> = struct_type
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "field_declaration_list")
        .collect();

    for list in lists {
        let mut list_cursor = list.walk();
        for decl in list
            .named_children(&mut list_cursor)
            .filter(|n| n.kind() == "field_declaration")
        {
            let type_node = decl.child_by_field_name("type");
            let type_name = type_node
                .map(|t| type_text(t, file))
                .unwrap_or_else(|| "unknown".to_string());
            let inline_struct = type_node
                .map(strip_pointer)
                .filter(|t| t.kind() == "struct_type")
                .map(|t| struct_from_node("struct{}", t, file));
            let tag = decl
                .child_by_field_name("tag")
                .map(|t| unquote(file.node_text(t)).to_string());

            let mut name_cursor = decl.walk();
            let names: Vec<&str> = decl
                .children_by_field_name("name", &mut name_cursor)
                .map(|n| file.node_text(n))
                .collect();

            if names.is_empty() {
                debug!("Skipping embedded field {} in {}", type_name, name);
                continue;
            }

            // `A, B int` declares two fields sharing type and tag
            for field_name in names {
                fields.push(FieldDef {
                    name: field_name.to_string(),
                    type_name: type_name.clone(),
                    tag: tag.clone(),
                    inline_struct: inline_struct.clone(),
                });
            }
        }
    }

    debug!("Parsed {} fields of {}", fields.len(), name);
    StructDef {
        name: name.to_string(),
        fields,
    }
}

/// Innermost type under any `*` markers.
pub fn strip_pointer(node: Node) -> Node {
    let mut current = node;
    while current.kind() == "pointer_type" {
        match current.named_child(0) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// Canonical text of a Go type node.
///
/// Pointers are `*T`, slices and arrays `[]T`, maps `map[K]V`, qualified
/// names `pkg.T`. Inline struct and interface types collapse to `struct{}`
/// and `interface{}`; generic instantiations reduce to their base type.
pub fn type_text(node: Node, file: &ParsedFile) -> String {
    match node.kind() {
        "type_identifier" => file.node_text(node).to_string(),
        "pointer_type" => match node.named_child(0) {
            Some(inner) => format!("*{}", type_text(inner, file)),
            None => "*unknown".to_string(),
        },
        "parenthesized_type" => match node.named_child(0) {
            Some(inner) => type_text(inner, file),
            None => "unknown".to_string(),
        },
        "qualified_type" => {
            let package = node
                .child_by_field_name("package")
                .map(|n| file.node_text(n))
                .unwrap_or_default();
            let name = node
                .child_by_field_name("name")
                .map(|n| file.node_text(n))
                .unwrap_or_default();
            format!("{}.{}", package, name)
        }
        "slice_type" | "array_type" | "implicit_length_array_type" => {
            match node.child_by_field_name("element") {
                Some(element) => format!("[]{}", type_text(element, file)),
                None => "[]unknown".to_string(),
            }
        }
        "map_type" => {
            let key = node
                .child_by_field_name("key")
                .map(|n| type_text(n, file))
                .unwrap_or_else(|| "unknown".to_string());
            let value = node
                .child_by_field_name("value")
                .map(|n| type_text(n, file))
                .unwrap_or_else(|| "unknown".to_string());
            format!("map[{}]{}", key, value)
        }
        "struct_type" => "struct{}".to_string(),
        "interface_type" => "interface{}".to_string(),
        "generic_type" => node
            .child_by_field_name("type")
            .map(|base| type_text(base, file))
            .unwrap_or_else(|| "unknown".to_string()),
        _ => file.node_text(node).to_string(),
    }
}
