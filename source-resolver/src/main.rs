//! list-sources - print capturable windows and screens
//!
//! # Usage
//!
//! ```bash
//! # Enumerate through the OS and print one entry per application
//! list-sources
//!
//! # Group the surfaces reported by a native picker, windows only
//! list-sources --group surfaces.json --filter windows
//! ```

use source_resolver::config::GeneralConfig;
use source_resolver::{ApplicationGrouper, Config, EnumerationOrchestrator, NativeSource, SurfaceFilter};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command line options
#[derive(Debug, Default)]
struct Options {
    config_path: Option<PathBuf>,
    group_file: Option<PathBuf>,
    surfaces: SurfaceFilter,
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-v" => {
                println!("list-sources v{}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    options.config_path = Some(PathBuf::from(&args[i]));
                }
            }
            "--group" | "-g" => {
                i += 1;
                if i < args.len() {
                    options.group_file = Some(PathBuf::from(&args[i]));
                }
            }
            "--filter" | "-f" => {
                i += 1;
                if i < args.len() {
                    match args[i].parse() {
                        Ok(surfaces) => options.surfaces = surfaces,
                        Err(e) => {
                            eprintln!("{}", e);
                            std::process::exit(1);
                        }
                    }
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Use --help for usage information.");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    options
}

fn print_help() {
    println!(
        r#"list-sources - Capturable window and screen resolver

USAGE:
    list-sources [OPTIONS]

OPTIONS:
    -h, --help              Show this help message
    -v, --version           Show version
    -c, --config <PATH>     Path to configuration file
    -g, --group <FILE>      Group native picker surfaces from a JSON file instead of enumerating
    -f, --filter <KIND>     all, windows or screens (default: all)

OUTPUT:
    JSON on stdout. Logs go to stderr; set RUST_LOG to override the configured level.

PERMISSIONS REQUIRED:
    - Automation: System Settings > Privacy & Security > Automation > System Events
    - Screen Recording: System Settings > Privacy & Security > Screen Recording
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = parse_args();

    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(Config::default_config_path);
    let loaded = Config::try_load_from_path(&config_path);

    // The subscriber needs the configured level, so load diagnostics wait for it
    let log_level = match &loaded {
        Ok(config) => config.general.log_level.clone(),
        Err(_) => GeneralConfig::default().log_level,
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::or_default(&config_path, loaded);

    debug!("Using {:?}", options);

    let output = match &options.group_file {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path).await?;
            let surfaces: Vec<NativeSource> = serde_json::from_str(&contents)?;
            let grouper = ApplicationGrouper::new(config.grouping.clone());
            let grouped = options.surfaces.retain(grouper.group(&surfaces));
            info!("Grouped {} surfaces into {} entries", surfaces.len(), grouped.len());
            serde_json::to_string_pretty(&grouped)?
        }
        None => {
            let orchestrator = EnumerationOrchestrator::new(&config);
            let sources: Vec<_> = orchestrator
                .enumerate()
                .await
                .into_iter()
                .filter(|s| options.surfaces.matches(s.kind))
                .collect();
            info!("Found {} capturable sources", sources.len());
            serde_json::to_string_pretty(&sources)?
        }
    };

    println!("{}", output);
    Ok(())
}
