use crate::error::Result;
use crate::parser::ParsedFile;
use log::debug;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Query, QueryCursor};

/// Import path of the Gin routing library.
pub const GIN_IMPORT_PATH: &str = "github.com/gin-gonic/gin";

/// Tree-sitter query for import specs, single or grouped.
const IMPORT_QUERY: &str = r#"
(import_spec
  name: (_)? @alias
  path: (_) @path
) @import
"#;

/// Framework detector for Go packages.
///
/// The `FrameworkDetector` reads `import` declarations to find out whether,
/// and under which name, a file imports Gin. Route extraction does not depend
/// on it (the verb convention is matched syntactically), but the classifier
/// needs the import name to recognize `*gin.Context` under an alias.
pub struct FrameworkDetector {
    query: Query,
}

/// How a single file imports Gin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GinImport {
    /// `import "github.com/gin-gonic/gin"` or an aliased import; holds the
    /// qualifier used in the file (`gin` unless aliased)
    Qualified(String),
    /// `import . "github.com/gin-gonic/gin"`
    Dot,
    /// Gin is not imported (or only blank-imported)
    Absent,
}

impl GinImport {
    /// Qualifier under which Gin's exported names appear in the file.
    pub fn qualifier(&self) -> Option<&str> {
        match self {
            GinImport::Qualified(name) => Some(name),
            _ => None,
        }
    }
}

/// Result of framework detection over a set of files.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Number of files that import Gin in any form
    pub files_importing_gin: usize,
    /// Number of files inspected
    pub files_inspected: usize,
}

impl DetectionResult {
    /// Whether at least one inspected file imports Gin.
    pub fn imports_gin(&self) -> bool {
        self.files_importing_gin > 0
    }
}

impl FrameworkDetector {
    /// Creates a detector, compiling the import query for the Go grammar.
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_go::LANGUAGE.into();
        let query = Query::new(&language, IMPORT_QUERY)?;
        Ok(Self { query })
    }

    /// Reports how `parsed` imports Gin.
    pub fn detect_file(&self, parsed: &ParsedFile) -> GinImport {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, parsed.root(), &parsed.source[..]);

        while let Some(m) = matches.next() {
            let mut path = "";
            let mut alias = None;

            for capture in m.captures {
                let capture_name = self.query.capture_names()[capture.index as usize];
                match capture_name {
                    "path" => path = parsed.node_text(capture.node),
                    "alias" => alias = Some(parsed.node_text(capture.node)),
                    _ => {}
                }
            }

            if path.trim_matches(|c| c == '"' || c == '`') != GIN_IMPORT_PATH {
                continue;
            }

            let import = match alias {
                None => GinImport::Qualified("gin".to_string()),
                Some(".") => GinImport::Dot,
                Some("_") => GinImport::Absent,
                Some(name) => GinImport::Qualified(name.to_string()),
            };
            debug!("{} imports gin as {:?}", parsed.path.display(), import);
            return import;
        }

        GinImport::Absent
    }

    /// Detects Gin usage across all provided files.
    pub fn detect(&self, parsed_files: &[ParsedFile]) -> DetectionResult {
        let files_importing_gin = parsed_files
            .iter()
            .filter(|file| self.detect_file(file) != GinImport::Absent)
            .count();

        DetectionResult {
            files_importing_gin,
            files_inspected: parsed_files.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::GoParser;
    use std::path::Path;

    fn parse(code: &str) -> ParsedFile {
        let mut parser = GoParser::new().unwrap();
        parser
            .parse_source(Path::new("main.go"), code.as_bytes().to_vec())
            .unwrap()
    }

    #[test]
    fn test_detect_plain_import() {
        let parsed = parse(
            r#"
package main

import "github.com/gin-gonic/gin"

func main() { gin.Default() }
"#,
        );
        let detector = FrameworkDetector::new().unwrap();
        assert_eq!(
            detector.detect_file(&parsed),
            GinImport::Qualified("gin".to_string())
        );
    }

    #[test]
    fn test_detect_grouped_aliased_import() {
        let parsed = parse(
            r#"
package main

import (
    "net/http"

    web "github.com/gin-gonic/gin"
)

func main() { _ = http.StatusOK; web.Default() }
"#,
        );
        let detector = FrameworkDetector::new().unwrap();
        let import = detector.detect_file(&parsed);
        assert_eq!(import, GinImport::Qualified("web".to_string()));
        assert_eq!(import.qualifier(), Some("web"));
    }

    #[test]
    fn test_detect_dot_import() {
        let parsed = parse(
            r#"
package main

import . "github.com/gin-gonic/gin"

func main() { Default() }
"#,
        );
        let detector = FrameworkDetector::new().unwrap();
        assert_eq!(detector.detect_file(&parsed), GinImport::Dot);
    }

    #[test]
    fn test_detect_no_gin() {
        let parsed = parse(
            r#"
package main

import "net/http"

func main() { http.ListenAndServe(":8080", nil) }
"#,
        );
        let detector = FrameworkDetector::new().unwrap();
        assert_eq!(detector.detect_file(&parsed), GinImport::Absent);
    }

    #[test]
    fn test_detect_across_files() {
        let with_gin = parse("package main\n\nimport \"github.com/gin-gonic/gin\"\n");
        let without = parse("package main\n\nimport \"fmt\"\n");
        let detector = FrameworkDetector::new().unwrap();

        let result = detector.detect(&[with_gin, without]);
        assert_eq!(result.files_importing_gin, 1);
        assert_eq!(result.files_inspected, 2);
        assert!(result.imports_gin());
    }

    #[test]
    fn test_detect_empty_file_list() {
        let detector = FrameworkDetector::new().unwrap();
        let result = detector.detect(&[]);
        assert!(!result.imports_gin());
    }
}
