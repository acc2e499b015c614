use clap::Parser;
use routeview::cli::commands::SimulateOptions;
use routeview::cli::{Cli, Commands};
use routeview::types::config::Config;
use routeview::RouteViewResult;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> RouteViewResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config).unwrap_or_else(|_| Config::default_config())
    } else {
        Config::default_config()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let directive = format!("routeview={}", log_level)
        .parse::<Directive>()
        .or_else(|_| "routeview=info".parse::<Directive>())
        .map_err(|e| routeview::RouteViewError::config(format!("invalid log directive: {}", e)))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    let registry = tracing_subscriber::registry().with(filter);
    if config.general.log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            routeview::cli::commands::init(path)?;
        }
        Commands::Simulate {
            script,
            max,
            name,
            summary,
        } => {
            let options = SimulateOptions { max, name, summary };
            routeview::cli::commands::simulate(&script, options, &config)?;
        }
        Commands::Version => {
            routeview::cli::commands::version();
        }
    }

    Ok(())
}
