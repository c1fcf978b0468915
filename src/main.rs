use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use devhealth::application::config::AppConfig;
use devhealth::application::services::agent::MonitorAgent;
use devhealth::infrastructure::collectors::network_probe::HttpNetworkProbe;
use devhealth::infrastructure::collectors::sysinfo_provider::SysinfoProvider;
use devhealth::infrastructure::notifications::build_dispatcher;
use devhealth::infrastructure::persistence::retry::RetryPolicy;
use devhealth::infrastructure::persistence::sqlite_store::SqliteRepository;
use devhealth::presentation::cli::app::{Cli, Commands};
use devhealth::presentation::cli::commands::check::run_check;
use devhealth::presentation::cli::commands::config::run_config;
use devhealth::presentation::cli::commands::history::run_history;
use devhealth::presentation::cli::commands::info::run_info;
use devhealth::presentation::cli::commands::run::run_agent;

fn print_banner(agent: &MonitorAgent) {
    println!("{}", "━".repeat(40).cyan());
    println!("{}", "  DEVHEALTH — Device Health Monitor".bold().cyan());
    println!("  device {}", agent.device_id());
    println!("{}", "━".repeat(40).cyan());
}

fn setup_tracing(verbose: bool, log_file: Option<&str>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let path = shellexpand::tilde(path);
            let path = Path::new(path.as_ref());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).context("Failed to create log directory")?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn open_repository(config: &AppConfig) -> anyhow::Result<SqliteRepository> {
    SqliteRepository::open(&config.storage.path, RetryPolicy::from(&config.storage))
        .with_context(|| format!("Failed to open database {}", config.storage.path))
}

fn build_agent(config: &AppConfig) -> anyhow::Result<MonitorAgent> {
    let settings = config.validate().context("Invalid configuration")?;

    // Manual DI: main.rs is the only place that knows concrete types
    let probe = if config.network.enabled {
        HttpNetworkProbe::new(&config.network)
            .map_err(|e| tracing::warn!("Network probe disabled: {e}"))
            .ok()
    } else {
        None
    };
    let provider = SysinfoProvider::new(probe);
    let repository = open_repository(config)?;
    let dispatcher = build_dispatcher(&config.notifications);

    Ok(MonitorAgent::new(
        settings,
        Arc::new(provider),
        Arc::new(repository),
        dispatcher,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => AppConfig::config_path()?,
    };
    let config = AppConfig::load_or_default(&config_path)?;

    setup_tracing(cli.verbose, config.logging.file.as_deref())?;

    match cli.command {
        Some(Commands::Run) | None => {
            let agent = build_agent(&config)?;
            print_banner(&agent);
            run_agent(&agent).await?;
        }
        Some(Commands::Check { json }) => {
            let agent = build_agent(&config)?;
            run_check(&agent, json).await?;
        }
        Some(Commands::Info { json }) => {
            run_info(&SysinfoProvider::new(None).system_info(), json)?;
        }
        Some(Commands::History {
            device,
            limit,
            json,
        }) => {
            let repository = open_repository(&config)?;
            run_history(&repository, device, limit, json)?;
        }
        Some(Commands::Config { write }) => {
            run_config(
                &config,
                &build_dispatcher(&config.notifications),
                &config_path,
                write,
            )?;
        }
    }

    Ok(())
}
