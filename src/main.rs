//! Pathway Layout CLI
//!
//! Usage:
//!   pathway-layout [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>  Layout configuration file (TOML format)
//!   -o, --output <FILE>  Write the Escher map to a file instead of stdout
//!   --compact            Write compact JSON
//!   -v, --verbose        Log placement decisions
//!   -h, --help           Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pathway_layout::{layout_with_config, LayoutConfig};

#[derive(Parser)]
#[command(name = "pathway-layout")]
#[command(about = "Automatic layout of reaction networks as Escher maps")]
struct Cli {
    /// Network description in JSON (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Layout configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write compact instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,

    /// Log placement decisions (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if cli.input.is_none() && io::stdin().is_terminal() {
        eprintln!("Reading network description from stdin (see --help)");
    }

    let config = match &cli.config {
        Some(path) => match LayoutConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => LayoutConfig::default(),
    };

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let result = match layout_with_config(&source, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    for skipped in &result.skipped {
        eprintln!("Skipped reaction '{}': {}", skipped.reaction(), skipped);
    }

    let escher = result.map.to_escher();
    let json = if cli.compact {
        escher.to_json()
    } else {
        escher.to_json_pretty()
    };
    let json = match json {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, json) {
                eprintln!("Error writing file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
        None => println!("{}", json),
    }
}
