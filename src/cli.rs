use crate::coordinator::Coordinator;
use crate::error::Error;
use crate::extractor::HttpMethod;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::schema_generator::SchemaGenerator;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Go OpenAPI Generator - Generate an OpenAPI document from a Gin application's source
#[derive(Parser, Debug)]
#[command(name = "go-openapi-from-source")]
#[command(author, about, long_about = None, disable_version_flag = true)]
pub struct CliArgs {
    /// Directory holding the Go package to analyze
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Output file (default: openapi.json, or openapi.yaml with --format yaml)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// API title
    #[arg(short = 't', long = "title", default_value = "Auto-Generated API")]
    pub title: String,

    /// API version
    #[arg(short = 'v', long = "version", value_name = "VER", default_value = "1.0.0")]
    pub version: String,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    fn default_file(self) -> &'static str {
        match self {
            OutputFormat::Json => "openapi.json",
            OutputFormat::Yaml => "openapi.yaml",
        }
    }

    fn accepts_suffix(self, file_name: &str) -> bool {
        match self {
            OutputFormat::Json => file_name.ends_with(".json"),
            OutputFormat::Yaml => file_name.ends_with(".yaml") || file_name.ends_with(".yml"),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            OutputFormat::Json => ".json",
            OutputFormat::Yaml => ".yaml",
        }
    }
}

/// Output path for the document, with the format's suffix appended when
/// the requested name lacks it.
pub fn output_path(requested: Option<&Path>, format: OutputFormat) -> PathBuf {
    let requested = match requested {
        Some(path) => path,
        None => return PathBuf::from(format.default_file()),
    };

    let name = requested.to_string_lossy();
    if format.accepts_suffix(&name) {
        requested.to_path_buf()
    } else {
        PathBuf::from(format!("{}{}", name, format.suffix()))
    }
}

/// Level the logger is pinned to, or `None` when `RUST_LOG` is set and
/// should decide on its own.
pub fn log_level(verbose: bool, rust_log_set: bool) -> Option<log::LevelFilter> {
    if rust_log_set {
        None
    } else if verbose {
        Some(log::LevelFilter::Debug)
    } else {
        Some(log::LevelFilter::Info)
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.source_dir.exists() {
        return Err(Error::InvalidArgument(format!(
            "source directory does not exist: {}",
            args.source_dir.display()
        ))
        .into());
    }

    if !args.source_dir.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "source path is not a directory: {}",
            args.source_dir.display()
        ))
        .into());
    }

    info!("Source directory: {}", args.source_dir.display());
    info!("Title: {}", args.title);
    info!("Version: {}", args.version);
    info!("Output format: {:?}", args.format);

    Ok(args)
}

/// Run the analysis and write the document
pub fn run(args: CliArgs) -> Result<()> {
    let output = output_path(args.output.as_deref(), args.format);
    info!("Output: {}", output.display());

    let mut coordinator = Coordinator::new().context("Failed to initialize the Go parser")?;
    let api = coordinator
        .analyze_api(&args.source_dir)
        .with_context(|| format!("Failed to analyze {}", args.source_dir.display()))?;

    if api.routes.is_empty() {
        return Err(Error::NoRoutesFound(args.source_dir.clone()).into());
    }
    info!("Found {} routes", api.routes.len());
    info!("Handlers analyzed: {}", api.handlers_resolved());

    info!("Generating OpenAPI specification...");
    let mut schema_gen = SchemaGenerator::new();
    let mut builder = OpenApiBuilder::new().with_info(args.title.as_str(), args.version.as_str());
    builder.add_api(&api, &mut schema_gen);
    let document = builder.build(schema_gen);

    let content = match args.format {
        OutputFormat::Json => serialize_json(&document),
        OutputFormat::Yaml => serialize_yaml(&document),
    }
    .context("Failed to serialize the OpenAPI document")?;

    write_to_file(&content, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log_summary(&document, &output);
    Ok(())
}

fn log_summary(document: &OpenApiDocument, output: &Path) {
    info!("OpenAPI specification generated");
    info!("  - Paths: {}", document.paths.len());
    info!("  - Schemas: {}", document.components.schemas.len());
    for (path, item) in &document.paths {
        for method in HttpMethod::CONCRETE {
            if item.operation(method).is_some() {
                info!("  - {} {}", method, path);
            }
        }
    }
    info!("File: {}", output.display());
}
