//! Go OpenAPI Generator - OpenAPI documents from the source of Gin applications.
//!
//! The library reads the top-level Go files of one directory, finds Gin route
//! registrations, follows each handler to its declaration in the same file,
//! classifies the handler's inputs and renders an OpenAPI 3.0.3 document.
//! Nothing is compiled or executed; every inference is syntactic.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Lists the `.go` files of a directory, skipping tests
//! 2. [`parser`] - Parses Go source with tree-sitter
//! 3. [`detector`] - Finds files importing Gin
//! 4. [`extractor`] - Recognizes route registration calls
//! 5. [`handler_resolver`] - Locates handler declarations
//! 6. [`type_resolver`] and [`struct_tag`] - Resolve same-file structs and parse field tags
//! 7. [`classifier`] and [`binding_inference`] - Assign parameter locations
//! 8. [`coordinator`] - Runs the pipeline over a directory
//! 9. [`schema_generator`], [`openapi_builder`] and [`serializer`] - Emit the document
//!
//! # Example Usage
//!
//! ```no_run
//! use go_openapi_from_source::{
//!     coordinator::Coordinator,
//!     openapi_builder::OpenApiBuilder,
//!     schema_generator::SchemaGenerator,
//!     serializer::serialize_yaml,
//! };
//! use std::path::Path;
//!
//! let mut coordinator = Coordinator::new().unwrap();
//! let api = coordinator.analyze_api(Path::new("./cmd/api")).unwrap();
//!
//! let mut schema_gen = SchemaGenerator::new();
//! let mut builder = OpenApiBuilder::new().with_info("Shop API", "1.2.0");
//! builder.add_api(&api, &mut schema_gen);
//! let document = builder.build(schema_gen);
//!
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod binding_inference;
pub mod classifier;
pub mod cli;
pub mod coordinator;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod handler_resolver;
pub mod openapi_builder;
pub mod parser;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod struct_tag;
pub mod type_resolver;
