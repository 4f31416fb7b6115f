//! Route inspection CLI.
//!
//! Loads a router configuration, compiles it the same way a running service
//! would, and answers questions about it without any handler code linked in.
//!
//! ```text
//! dispatch-router --config router.toml check
//! dispatch-router --config router.toml resolve GET /users/42
//! dispatch-router --config router.toml localize /users/$id id=42
//! dispatch-router --config router.toml unlocalize /benutzer/42
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::json;

use dispatch_router::config::{load_config, ConfigError, DispatchConfig};
use dispatch_router::handler::AssumeCallable;
use dispatch_router::observability::logging::init_logging;
use dispatch_router::routing::{Params, Router, Walk};

#[derive(Parser)]
#[command(name = "dispatch-router")]
#[command(about = "Inspect a dispatch-router configuration", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and compile the configuration
    Check,
    /// Show what a request would resolve to
    Resolve {
        method: String,
        path: String,
    },
    /// Turn a canonical route into its localized path
    Localize {
        route: String,
        /// Parameter values as name=value
        params: Vec<String>,
    },
    /// Turn a localized path back into canonical segments
    Unlocalize {
        path: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, router) = load_router(&cli.config)?;

    match cli.command {
        Commands::Check => {
            println!(
                "{}: {} routes, {} locales (active '{}'), root '{}'",
                cli.config.display(),
                router.tree().route_count(),
                config.localizations.len(),
                router.localizer().locale(),
                router.root()
            );
            for route in &config.routes {
                let methods = route
                    .methods
                    .as_ref()
                    .map(|m| m.joined())
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "ANY".to_string());
                println!("  {:<16} {:<32} {}", methods, route.pattern, route.target);
            }
        }
        Commands::Resolve { method, path } => {
            let report = match router.match_request(&path, &method, &AssumeCallable) {
                Walk::Complete(result) => json!({
                    "matched": result.is_match(),
                    "route": result.route(false),
                    "result": result,
                }),
                Walk::Forbidden { prefix, path } => json!({
                    "matched": false,
                    "forbidden": { "prefix": prefix, "path": path },
                }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Localize { route, params } => {
            let params = parse_params(&params)?;
            println!("{}", router.localize(&route, Some(&params)));
        }
        Commands::Unlocalize { path } => {
            println!("{}", router.unlocalize(&path));
        }
    }

    Ok(())
}

/// Loads, validates and compiles the configuration at `path`.
fn load_router(path: &Path) -> Result<(DispatchConfig, Router), ConfigError> {
    let config = load_config(path)?;
    init_logging(&config.observability.log_level);
    let router = Router::build(&config, &AssumeCallable)?;
    Ok((config, router))
}

fn parse_params(raw: &[String]) -> Result<Params, String> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .ok_or_else(|| format!("expected name=value, got '{}'", pair))
        })
        .collect()
}
