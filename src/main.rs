//! Go OpenAPI Generator - Command-line tool deriving an OpenAPI document from
//! the source of a Gin application.
//!
//! # Usage
//!
//! ```bash
//! go-openapi-from-source <SOURCE_DIR> [OPTIONS]
//! ```
//!
//! # Examples
//!
//! ```bash
//! go-openapi-from-source ./cmd/api
//! go-openapi-from-source . -o myapi.json -t "My API" -v 2.0.0
//! go-openapi-from-source ./internal/api -f yaml --output docs/openapi
//! ```

use anyhow::Result;
use clap::Parser;
use go_openapi_from_source::cli;
use log::info;

fn main() -> Result<()> {
    // Parse once up front so --verbose can drive the logger before validation logs
    let args_for_verbose = cli::CliArgs::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if let Some(level) =
        cli::log_level(args_for_verbose.verbose, std::env::var_os("RUST_LOG").is_some())
    {
        logger.filter_level(level);
    }
    logger.init();

    info!("Go OpenAPI Generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
