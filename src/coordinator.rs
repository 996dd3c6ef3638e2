use crate::binding_inference::infer_bindings;
use crate::classifier::ParameterClassifier;
use crate::detector::FrameworkDetector;
use crate::error::Result;
use crate::extractor::gin::GinExtractor;
use crate::extractor::{RouteDescriptor, RouteExtractor};
use crate::handler_resolver::{HandlerDescriptor, HandlerResolver, ResolvedHandler};
use crate::parser::{GoParser, ParsedFile};
use crate::scanner::FileScanner;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything learned about a Go package's HTTP surface in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescription {
    /// Routes in file order, then document order within each file
    pub routes: Vec<RouteDescription>,
    /// Number of Go files analyzed
    pub files_analyzed: usize,
    /// Number of analyzed files importing Gin
    pub files_importing_gin: usize,
}

/// A route paired with its handler, when the handler could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescription {
    pub route: RouteDescriptor,
    pub handler: Option<HandlerDescriptor>,
}

impl ApiDescription {
    /// Number of routes whose handler declaration was found.
    pub fn handlers_resolved(&self) -> usize {
        self.routes.iter().filter(|r| r.handler.is_some()).count()
    }
}

/// Runs the analysis pipeline over one directory.
///
/// A `Coordinator` owns its tree-sitter parser and every other stateful
/// collaborator; construct a new one per run.
///
/// # Example
///
/// ```no_run
/// use go_openapi_from_source::coordinator::Coordinator;
/// use std::path::Path;
///
/// let mut coordinator = Coordinator::new().unwrap();
/// let api = coordinator.analyze_api(Path::new("./cmd/api")).unwrap();
/// println!("{} routes", api.routes.len());
/// ```
pub struct Coordinator {
    parser: GoParser,
    detector: FrameworkDetector,
    extractor: GinExtractor,
    resolver: HandlerResolver,
}

impl Coordinator {
    /// Creates a coordinator with the default handler resolver.
    pub fn new() -> Result<Self> {
        Self::with_resolver(HandlerResolver::new())
    }

    /// Creates a coordinator using a custom handler resolver.
    pub fn with_resolver(resolver: HandlerResolver) -> Result<Self> {
        Ok(Self {
            parser: GoParser::new()?,
            detector: FrameworkDetector::new()?,
            extractor: GinExtractor,
            resolver,
        })
    }

    /// Analyzes the top-level Go files of `dir`.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be read or any file fails to read or
    /// parse; no partial description is returned. Finding no routes is not
    /// an error here.
    pub fn analyze_api(&mut self, dir: &Path) -> Result<ApiDescription> {
        info!("Scanning {}", dir.display());
        let scan = FileScanner::new(dir.to_path_buf()).scan()?;
        info!(
            "Found {} Go files ({} test files skipped)",
            scan.go_files.len(),
            scan.skipped_test_files
        );

        let parsed_files = scan
            .go_files
            .iter()
            .map(|path| self.parser.parse_file(path))
            .collect::<Result<Vec<ParsedFile>>>()?;

        let detection = self.detector.detect(&parsed_files);
        if !parsed_files.is_empty() && !detection.imports_gin() {
            warn!("No file in {} imports {}", dir.display(), crate::detector::GIN_IMPORT_PATH);
        }

        let mut routes = Vec::new();
        for parsed in &parsed_files {
            routes.extend(self.analyze_file(parsed));
        }

        let api = ApiDescription {
            routes,
            files_analyzed: parsed_files.len(),
            files_importing_gin: detection.files_importing_gin,
        };
        info!(
            "Extracted {} routes, {} handlers resolved",
            api.routes.len(),
            api.handlers_resolved()
        );
        Ok(api)
    }

    /// Extracts, resolves and classifies the routes registered in one file.
    pub fn analyze_file(&self, parsed: &ParsedFile) -> Vec<RouteDescription> {
        let routes = self.extractor.extract_routes(parsed);
        if routes.is_empty() {
            return Vec::new();
        }

        let mut classifier = ParameterClassifier::new(parsed, self.detector.detect_file(parsed));

        routes
            .into_iter()
            .map(|route| {
                let handler = self
                    .resolver
                    .resolve(&route.handler_reference, parsed)
                    .map(|resolved| describe_handler(&resolved, &mut classifier, parsed));
                if handler.is_none() {
                    debug!(
                        "Route {} {} keeps an unresolved handler {}",
                        route.method, route.url_template, route.handler_reference
                    );
                }
                RouteDescription { route, handler }
            })
            .collect()
    }
}

/// Classifies a resolved declaration's parameters and body bindings.
fn describe_handler(
    resolved: &ResolvedHandler,
    classifier: &mut ParameterClassifier,
    parsed: &ParsedFile,
) -> HandlerDescriptor {
    let parameters = resolved
        .parameters
        .iter()
        .map(|p| classifier.classify(&p.name, &p.type_name, p.type_node))
        .collect();
    let body_bindings = infer_bindings(resolved, classifier, parsed);

    HandlerDescriptor {
        name: resolved.name.clone(),
        declaring_scope: resolved.declaring_scope.clone(),
        source_file: resolved.source_file.clone(),
        parameters,
        body_bindings,
        primary_return_type: resolved.primary_return_type.clone(),
        has_error_return: resolved.has_error_return,
    }
}
