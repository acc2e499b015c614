//! Command line interface for routeview.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// routeview - keep-alive router view with scroll memory.
#[derive(Parser, Debug)]
#[command(name = "routeview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "routeview.toml")]
    pub config: PathBuf,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Errors only.
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Writes a default configuration.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Replays a navigation script and prints one JSON line per step.
    Simulate {
        /// Script file (TOML).
        script: PathBuf,

        /// Cache capacity, overriding config and script (0 = unbounded).
        #[arg(short, long)]
        max: Option<usize>,

        /// Slot name, overriding config and script.
        #[arg(short, long)]
        name: Option<String>,

        /// Also print a summary line at the end.
        #[arg(short, long)]
        summary: bool,
    },

    /// Shows version.
    Version,
}
