use ::std::{
    net::{Ipv4Addr, SocketAddrV4},
    sync::Arc,
    time::Duration,
};

use ::rucalc_common::{
    config::{load_config, Args},
    error::{Result, RucalcError},
};
use ::rucalc_orchestrator::{get_server, OrchestratorConfig, Scheduler};
use tracing::info;

#[tokio::main]
/// Start Rucalc orchestrator
async fn main() -> Result<()> {
    // setup tracing
    tracing_subscriber::fmt::init();

    let Args { config_path } = Args::parse_args();
    let OrchestratorConfig {
        port,
        task_grace_period_millis,
        operation_times,
    } = load_config(&config_path)?;
    info!("Operation times: {:?}", operation_times);

    let scheduler = Arc::new(Scheduler::new(
        operation_times,
        Duration::from_millis(task_grace_period_millis),
    ));
    tokio::spawn(scheduler.clone().run_deadline_monitor());
    let app = get_server(scheduler)?;

    // run it
    let endpoint = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
    let listener = tokio::net::TcpListener::bind(endpoint)
        .await
        .map_err(RucalcError::fail_to_start_server)?;
    info!(
        "Rucalc orchestrator is listening on {}",
        listener
            .local_addr()
            .map_err(RucalcError::fail_to_start_server)?
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(RucalcError::fail_to_start_server)?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // keep serving if the signal handler cannot be installed
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        ::std::future::pending::<()>().await;
    }
    info!("Shutting down rucalc orchestrator");
}
