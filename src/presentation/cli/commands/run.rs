use std::future::Future;

use anyhow::Context;

use crate::application::services::agent::{MonitorAgent, StartOutcome};

/// Run the monitoring agent until Ctrl+C.
///
/// SIGTERM is not handled; under a service manager configure SIGINT as the
/// stop signal.
///
/// # Errors
///
/// Returns an error if the agent cannot start or the signal handler cannot
/// be installed.
pub async fn run_agent(agent: &MonitorAgent) -> anyhow::Result<()> {
    run_until(agent, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl+C: {e}");
        }
    })
    .await
}

/// Start the agent, wait for `shutdown`, then stop it and wait for the
/// in-flight tick to finish.
///
/// # Errors
///
/// Returns an error if the agent cannot start.
pub async fn run_until<F>(agent: &MonitorAgent, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    match agent.start().context("Failed to start the monitoring agent")? {
        StartOutcome::Started => {}
        StartOutcome::AlreadyActive(phase) => {
            tracing::warn!("Agent already {phase}, not starting another loop");
        }
    }

    shutdown.await;
    tracing::info!("Shutdown requested, finishing the current tick...");
    agent.stop().await;
    Ok(())
}
