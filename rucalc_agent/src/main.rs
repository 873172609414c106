use ::std::time::Duration;

use ::rucalc_agent::{dispatcher::Agent, orchestrator_client::OrchestratorClient, AgentConfig};
use ::rucalc_common::{
    config::{load_config, Args},
    error::{Result, RucalcError},
    tokio::{self, signal},
    tracing::{info, warn},
    tracing_subscriber,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let Args { config_path } = Args::parse_args();
    let AgentConfig {
        workers,
        orchestrator,
        request_timeout_millis,
    } = load_config(&config_path)?;

    let base_url = orchestrator.base_url();
    let client = OrchestratorClient::new(
        base_url.clone(),
        Duration::from_millis(request_timeout_millis),
    )
    .map_err(RucalcError::fail_to_start_agent)?;

    info!("Rucalc agent starts {} workers for {}", workers, base_url);
    Agent::new(client, workers).run(shutdown_signal()).await;
    info!("Rucalc agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        ::std::future::pending::<()>().await;
    }
}
