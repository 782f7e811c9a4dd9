pub mod args;
pub mod color;
pub mod commands;
pub mod validate;

use anyhow::{Context, Result};
use clap::Parser;
use heatwalk_core::NavConfig;
use heatwalk_core::config::default_config_path;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Effective configuration plus the file it was read from, if any.
pub struct Loaded {
    pub cfg: NavConfig,
    pub path: Option<PathBuf>,
}

pub async fn run() -> Result<()> {
    let cli = args::Cli::parse();
    init_logging(cli.verbose);

    let loaded = load_config(&cli)?;
    println!();

    match &cli.cmd {
        args::Commands::Route {
            from,
            to,
            profile,
            json,
        } => {
            let from = validate::parse_lng_lat(from, "origin")?;
            let to = validate::parse_lng_lat(to, "destination")?;
            validate::validate_endpoints(from, to)?;
            let profile = validate::parse_profile(profile)?;
            commands::route::run(&loaded.cfg, from, to, profile, *json).await
        }

        args::Commands::Preview { from, to } => {
            let from = validate::parse_lng_lat(from, "origin")?;
            let to = validate::parse_lng_lat(to, "destination")?;
            validate::validate_endpoints(from, to)?;
            commands::preview::run(&loaded.cfg, from, to).await
        }

        args::Commands::Simulate(sim) => {
            validate::validate_simulation(sim.pace_mps, sim.interval_s)?;
            commands::simulate::run(&loaded.cfg, sim).await
        }

        args::Commands::Config => commands::config::run(&loaded),
    }
}

/// `RUST_LOG` when set, otherwise warn / info / debug by `-v` count.
fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &args::Cli) -> Result<Loaded> {
    let path = cli.config.clone().or_else(default_config_path);
    let mut cfg = NavConfig::load(path.as_deref()).context("Failed to load configuration")?;

    if let Some(url) = cli.gh_url.as_deref() {
        cfg.routing.base_url = url.to_string();
    }
    if let Some(ms) = cli.timeout_ms {
        cfg.routing.timeout_ms = ms;
    }

    let path = path.filter(|p| p.exists());
    Ok(Loaded { cfg, path })
}
