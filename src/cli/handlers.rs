//! Subcommand handlers
//!
//! Each handler returns the process exit code: 0 on success, 1 for
//! resolution failures and usage errors, 2 when the catalog could not be
//! retrieved.

use super::commands::{CatalogArgs, ConfigArgs, ResolveArgs, TablesArgs, TagArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::WheelmatchConfig;
use crate::extractors::write_tables;
use crate::matcher::{MatchError, RequestDescriptor};
use crate::service::{ResolverService, ServiceError};
use crate::tags::to_dotted;
use anyhow::Result;
use tracing::{debug, info};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_FETCH: i32 = 2;

/// Environment configuration with command-line overrides applied.
fn effective_config(source: &CatalogArgs) -> Result<WheelmatchConfig, ServiceError> {
    let mut config = WheelmatchConfig::from_env()?;

    if let Some(catalog) = &source.catalog {
        config.catalog_url = Some(catalog.clone());
    }
    if source.no_cache {
        config.cache_enabled = false;
    }
    if let Some(timeout) = source.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(h1) = &source.h1 {
        config.h1_marker = h1.clone();
    }
    if let Some(h2) = &source.h2 {
        config.h2_marker = h2.clone();
    }

    config.validate()?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn catalog_location(config: &WheelmatchConfig) -> Result<String, ServiceError> {
    config.catalog_url.clone().ok_or(ServiceError::MissingCatalog)
}

fn print_output(output: Result<String>) -> i32 {
    match output {
        Ok(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

fn report(err: &ServiceError) -> i32 {
    eprintln!("{}", err.help_message());
    err.exit_code()
}

pub fn handle_resolve(args: &ResolveArgs, verbose: bool) -> i32 {
    let formatter = OutputFormatter::new(args.format.into());

    let prepared = effective_config(&args.source).and_then(|config| {
        let location = catalog_location(&config)?;
        let service = ResolverService::from_config(&config)?;
        Ok((service, location))
    });
    let (service, location) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return report(&e),
    };

    let request = RequestDescriptor::new(&args.package, &args.torch, &args.cuda, &args.python)
        .with_abi_relaxation(args.abi_relaxation)
        .with_variant(args.variant.clone());
    info!(
        package = %request.package,
        torch = %request.framework_version,
        accelerator = %request.accelerator,
        python = %request.language,
        catalog = %location,
        "Resolving"
    );

    match service.resolve(&location, args.kind.0, &request) {
        Ok(resolution) => {
            let output = if verbose {
                formatter.format_resolution_details(&resolution)
            } else {
                formatter.format_resolution(&resolution)
            };
            print_output(output)
        }
        Err(ServiceError::Match(MatchError::ResolutionFailure(failure)))
            if formatter.format() != OutputFormat::Human =>
        {
            // Machine-readable callers get the failure document on stdout.
            print_output(formatter.format_failure(&failure));
            EXIT_FAILURE
        }
        Err(e) => report(&e),
    }
}

pub fn handle_tables(args: &TablesArgs) -> i32 {
    let tables = effective_config(&args.source).and_then(|config| {
        let location = catalog_location(&config)?;
        ResolverService::from_config(&config)?.extract_tables(&location)
    });
    let tables = match tables {
        Ok(tables) => tables,
        Err(e) => return report(&e),
    };

    match &args.output {
        Some(path) => match write_tables(&tables, path) {
            Ok(()) => {
                info!(count = tables.len(), path = %path.display(), "Tables written");
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {:#}", e);
                EXIT_FETCH
            }
        },
        None => print_output(OutputFormatter::new(args.format.into()).format_tables(&tables)),
    }
}

pub fn handle_tag(args: &TagArgs) -> i32 {
    match to_dotted(&args.tag) {
        Ok(dotted) => print_output(OutputFormatter::new(OutputFormat::Human).format_tag(&args.tag, &dotted)),
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = match WheelmatchConfig::from_env() {
        Ok(config) => config,
        Err(e) => return report(&ServiceError::from(e)),
    };

    let code = print_output(OutputFormatter::new(args.format.into()).format_config(&config));
    if let Err(e) = config.validate() {
        eprintln!("Warning: {}", e);
        return EXIT_FAILURE;
    }
    code
}
