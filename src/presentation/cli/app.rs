use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// devhealth — device health monitoring agent
///
/// Samples CPU, memory, disk, temperature and network health at a fixed
/// interval, stores every sample and alerts when a threshold is breached.
#[derive(Parser, Debug)]
#[command(name = "devhealth")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to custom config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the monitoring agent (default)
    #[command(alias = "r")]
    Run,

    /// Take one sample now, store it and report the verdict
    #[command(alias = "c")]
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show host information
    #[command(alias = "i")]
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recently stored samples
    #[command(alias = "h")]
    History {
        /// Only samples recorded by this device
        #[arg(short, long)]
        device: Option<Uuid>,

        /// Maximum number of samples
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(short, long)]
        write: bool,
    },
}
