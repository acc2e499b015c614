//! CLI command implementations.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::sim::{Script, Simulation};
use crate::types::config::{Config, ViewConfig};
use crate::RouteViewResult;

/// Writes a default configuration file.
pub fn init(path: Option<PathBuf>) -> RouteViewResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("routeview.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    Config::default_config().save(&config_path)?;

    println!("routeview initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set [view] max to bound the cache");
    println!("  2. Replay a script: routeview simulate demos/navigation.toml");

    Ok(())
}

/// Options of the `simulate` command.
#[derive(Debug, Default)]
pub struct SimulateOptions {
    pub max: Option<usize>,
    pub name: Option<String>,
    pub summary: bool,
}

/// Replays a navigation script, writing one JSON line per step to stdout.
pub fn simulate(script_path: &Path, options: SimulateOptions, config: &Config) -> RouteViewResult<()> {
    let script = Script::load(script_path)?;
    tracing::info!(
        script = %script_path.display(),
        steps = script.steps.len(),
        "Replaying navigation script"
    );

    // Command line wins over the script, which wins over the config file
    let mut view = script.view.clone().unwrap_or_else(|| config.view.clone());
    if let Some(max) = options.max {
        view.max = max;
    }
    if let Some(name) = options.name {
        view.name = name;
    }

    let script = Script {
        view: Some(view),
        ..script
    };
    let mut sim = Simulation::new(&script, &ViewConfig::default(), config.general.production)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for step in &script.steps {
        let report = sim.step(step)?;
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    }

    let summary = sim.summary();
    let destroyed = sim.finish();
    tracing::debug!(destroyed, "Simulation finished");

    if options.summary {
        writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    }
    Ok(())
}

/// Shows version.
pub fn version() {
    println!("routeview {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Keep-alive router view with scroll memory");
}
