//! bcp-report - Carbon footprint results for a situation snapshot
//!
//! Loads a JSON situation snapshot, aggregates it with the configured
//! taxonomy and policies, optionally narrows the result tree, and prints it
//! as text (tCO2e) or JSON (kgCO2e).

use anyhow::{Context, Result};
use bcp_common::config::{load_config, TomlConfig};
use bcp_common::snapshot::Situation;
use bcp_common::{
    compute_results_by_post, filter_results, AggregationOptions, Environment, LeafFilter, StudySite,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented table in tCO2e
    Text,
    /// Full result tree in kgCO2e
    Json,
}

/// Command-line arguments for bcp-report
#[derive(Parser, Debug)]
#[command(name = "bcp-report")]
#[command(about = "Carbon footprint results report for a situation snapshot")]
#[command(version)]
struct Args {
    /// Situation snapshot (JSON)
    #[arg(short, long)]
    situation: PathBuf,

    /// Configuration file (TOML); falls back to BCP_CONFIG, then the platform config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Taxonomy to aggregate with (bilan-carbone, cut, tilt)
    #[arg(short, long)]
    environment: Option<Environment>,

    /// Restrict to one study site
    #[arg(long)]
    site: Option<String>,

    /// Aggregate validated sources only (`--validated-only=false` overrides the config)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    validated_only: Option<bool>,

    /// Zero dependency-only SubPosts (`--without-dependencies=false` overrides the config)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    without_dependencies: Option<bool>,

    /// Keep sources carrying any of these tags
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Drop sources carrying any of these tags
    #[arg(long = "exclude-tag")]
    exclude_tags: Vec<String>,

    /// Show one line per emission source
    #[arg(long)]
    leaves: bool,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn leaf_filters(args: &Args) -> Vec<LeafFilter> {
    let mut filters = Vec::new();
    if !args.tags.is_empty() {
        filters.push(LeafFilter::WithTags(args.tags.clone()));
    }
    if !args.exclude_tags.is_empty() {
        filters.push(LeafFilter::WithoutTags(args.exclude_tags.clone()));
    }
    filters
}

/// Config defaults with the command-line overrides applied
fn aggregation_options(args: &Args, config: &TomlConfig) -> AggregationOptions {
    let mut options = config.aggregation_options();
    if let Some(environment) = args.environment {
        options.environment = environment;
    }
    if let Some(site) = &args.site {
        options.study_site = StudySite::Site(site.clone());
    }
    if let Some(validated_only) = args.validated_only {
        options.validated_only = validated_only;
    }
    if let Some(without_dependencies) = args.without_dependencies {
        options.include_dependencies = !without_dependencies;
    }
    options
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting BCP report (bcp-report) v{}", env!("CARGO_PKG_VERSION"));

    let situation = Situation::load(&args.situation)
        .with_context(|| format!("Failed to load situation {}", args.situation.display()))?;

    let options = aggregation_options(&args, &config);

    info!(
        "Aggregating with {} (site: {:?}, validated only: {}, dependencies: {})",
        options.environment, options.study_site, options.validated_only, options.include_dependencies
    );

    let tree = compute_results_by_post(&situation.sources, &options)?;

    let filters = leaf_filters(&args);
    let tree = if filters.is_empty() {
        tree
    } else {
        filter_results(&tree, &filters)
    };

    match args.format {
        Format::Text => print!("{}", render::render_text(&tree, args.leaves)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
    }

    Ok(())
}
