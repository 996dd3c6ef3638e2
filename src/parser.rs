use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// Go source parser backed by tree-sitter.
///
/// A `GoParser` owns one `tree_sitter::Parser`, which is neither `Sync` nor
/// meant to be shared; create one per analysis run.
///
/// # Example
///
/// ```no_run
/// use go_openapi_from_source::parser::GoParser;
/// use std::path::Path;
///
/// let mut parser = GoParser::new().unwrap();
/// let parsed = parser.parse_file(Path::new("main.go")).unwrap();
/// println!("package {:?}", parsed.package_name());
/// ```
pub struct GoParser {
    parser: Parser,
}

/// A successfully parsed Go file with its syntax tree.
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Raw source bytes (node text is sliced from here)
    pub source: Vec<u8>,
    /// The tree-sitter syntax tree
    pub tree: Tree,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("path", &self.path)
            .field("bytes", &self.source.len())
            .finish()
    }
}

impl ParsedFile {
    /// Root node of the syntax tree.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// The name declared by the file's `package` clause, if any.
    pub fn package_name(&self) -> Option<&str> {
        let root = self.root();
        let mut cursor = root.walk();
        let clause = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_clause")?;
        let mut clause_cursor = clause.walk();
        let ident = clause
            .named_children(&mut clause_cursor)
            .find(|n| n.kind() == "package_identifier")?;
        Some(self.node_text(ident))
    }
}

impl GoParser {
    /// Creates a parser configured with the Go grammar.
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Reads and parses a single Go source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the resulting tree
    /// contains syntax errors. Partial trees are never returned.
    pub fn parse_file(&mut self, path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());
        let source = fs::read(path)?;
        self.parse_source(path, source)
    }

    /// Parses Go source that has already been loaded.
    pub fn parse_source(&mut self, path: &Path, source: Vec<u8>) -> Result<ParsedFile> {
        let tree = self.parser.parse(&source, None).ok_or_else(|| Error::Parse {
            file: path.to_path_buf(),
            line: 0,
            message: "parser produced no tree".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, message) = match first_error(root) {
                Some(node) if node.is_missing() => (
                    node.start_position().row + 1,
                    format!("missing {}", node.kind()),
                ),
                Some(node) => (node.start_position().row + 1, "syntax error".to_string()),
                None => (0, "syntax error".to_string()),
            };
            return Err(Error::Parse {
                file: path.to_path_buf(),
                line,
                message,
            });
        }

        debug!("Successfully parsed file: {}", path.display());

        Ok(ParsedFile {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }
}

/// Named nodes of a subtree in pre-order (document order), `node` first.
pub fn named_descendants<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut nodes = Vec::new();
    collect_named(node, &mut nodes);
    nodes
}

fn collect_named<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    out.push(node);
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_named(child, out);
    }
}

/// Depth-first search for the first ERROR or MISSING node.
fn first_error<'a>(node: Node<'a>) -> Option<Node<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_valid_go_file() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
package handlers

type User struct {
    ID   int    `json:"id"`
    Name string `json:"name"`
}

func GetUser(id int) (*User, error) {
    return nil, nil
}
"#;
        let file_path = create_temp_file(&temp_dir, "user.go", code);
        let mut parser = GoParser::new().unwrap();
        let parsed = parser.parse_file(&file_path).unwrap();

        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.package_name(), Some("handlers"));
        assert_eq!(parsed.root().kind(), "source_file");
    }

    #[test]
    fn test_parse_invalid_go_file() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
package main

func broken( {
    x :=
}
"#;
        let file_path = create_temp_file(&temp_dir, "broken.go", code);
        let mut parser = GoParser::new().unwrap();
        let err = parser.parse_file(&file_path).unwrap_err();

        match err {
            Error::Parse { file, line, .. } => {
                assert_eq!(file, file_path);
                assert!(line >= 1);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let mut parser = GoParser::new().unwrap();
        let err = parser
            .parse_file(Path::new("/nonexistent/file.go"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_parser_is_reusable_across_files() {
        let mut parser = GoParser::new().unwrap();
        let first = parser
            .parse_source(Path::new("a.go"), b"package a\n".to_vec())
            .unwrap();
        let second = parser
            .parse_source(Path::new("b.go"), b"package b\nfunc F() {}\n".to_vec())
            .unwrap();

        assert_eq!(first.package_name(), Some("a"));
        assert_eq!(second.package_name(), Some("b"));
    }

    #[test]
    fn test_node_text() {
        let mut parser = GoParser::new().unwrap();
        let parsed = parser
            .parse_source(Path::new("x.go"), b"package x\nfunc Hello() {}\n".to_vec())
            .unwrap();
        let root = parsed.root();
        let mut cursor = root.walk();
        let func = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "function_declaration")
            .unwrap();
        let name = func.child_by_field_name("name").unwrap();
        assert_eq!(parsed.node_text(name), "Hello");
    }

    #[test]
    fn test_named_descendants_preorder() {
        let mut parser = GoParser::new().unwrap();
        let parsed = parser
            .parse_source(
                Path::new("x.go"),
                b"package x\nfunc A() {}\nfunc B() {}\n".to_vec(),
            )
            .unwrap();
        let names: Vec<&str> = named_descendants(parsed.root())
            .into_iter()
            .filter(|n| n.kind() == "function_declaration")
            .filter_map(|n| n.child_by_field_name("name"))
            .map(|n| parsed.node_text(n))
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
