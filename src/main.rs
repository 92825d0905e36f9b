//! `router-layout` command line.
//!
//! Loads a component manifest and runs navigations through a layout container,
//! printing every committed layout as JSON.
//!
//! ```text
//! router-layout resolve --manifest app.toml --route / --route /test
//! router-layout check --manifest app.toml
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use router_layout::config::{load_config, load_manifest, LayoutConfig};
use router_layout::navigation::{NavigationCoordinator, TransitionKind};
use router_layout::observability::logging;

#[derive(Parser)]
#[command(name = "router-layout")]
#[command(about = "Resolve route layouts from a component manifest", long_about = None)]
struct Cli {
    /// Optional configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Navigate through routes in order and print each committed layout
    Resolve {
        #[arg(short, long)]
        manifest: PathBuf,

        /// Route paths; the first enters the container, the rest update it
        #[arg(short, long = "route", required = true)]
        routes: Vec<String>,
    },
    /// Validate a manifest and list its routes
    Check {
        #[arg(short, long)]
        manifest: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LayoutConfig::default(),
    };
    logging::init(&config.observability)?;

    tracing::debug!(
        default_layout = %config.container.default_layout,
        primary_view = %config.container.primary_view,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Resolve { manifest, routes } => resolve(&config, &manifest, &routes).await,
        Commands::Check { manifest } => check(&config, &manifest),
    }
}

async fn resolve(
    config: &LayoutConfig,
    manifest: &Path,
    routes: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_manifest(manifest)?.build(&config.container.primary_view)?;
    let resolver = registry.layouts().clone().into_resolver();
    let coordinator = Arc::new(NavigationCoordinator::with_config(resolver, &config.container));

    for (i, path) in routes.iter().enumerate() {
        let Some(chain) = registry.chain(path) else {
            tracing::error!(route = %path, "No route matched");
            println!("{}", json!({ "route": path, "error": "no matching route" }));
            continue;
        };

        let kind = if i == 0 { TransitionKind::Enter } else { TransitionKind::Update };
        let output = match coordinator.transition(kind, &chain).await {
            Ok(committed) => json!({
                "route": path,
                "transition": kind.as_str(),
                "layout": committed.layout.name,
                "props": committed.layout.props,
                "change": committed.change.to_string(),
                "page": committed.page.as_ref().map(|p| p.display_name().to_string()),
            }),
            Err(err) => json!({
                "route": path,
                "transition": kind.as_str(),
                "error": err.to_string(),
                "kept_layout": coordinator.current_layout().map(|l| l.name),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}

fn check(config: &LayoutConfig, manifest: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_manifest(manifest)?.build(&config.container.primary_view)?;
    for path in registry.paths() {
        println!("{}", path);
    }
    tracing::info!(manifest = %manifest.display(), "Manifest is valid");
    Ok(())
}
