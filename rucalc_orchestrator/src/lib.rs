use ::std::sync::Arc;

use ::rucalc_common::{error::Result, serde::Deserialize};
use api::router::get_api_router;
use axum::Router;
use internal::router::get_internal_router;
use state::AppState;
use tower_http::trace::TraceLayer;

pub use calc::{
    scheduler::{Scheduler, DEFAULT_GRACE_PERIOD},
    OperationTimes,
};

pub(crate) mod api;
pub mod calc;
pub mod error;
pub(crate) mod internal;
pub(crate) mod state;

/// Configuration for rucalc orchestrator
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(crate = "rucalc_common::serde")]
pub struct OrchestratorConfig {
    #[serde(default = "OrchestratorConfig::default_port")]
    pub port: u16,
    /// Added to the operation time of a dispatched task before it is requeued
    #[serde(default = "OrchestratorConfig::default_task_grace_period_millis")]
    pub task_grace_period_millis: u64,
    pub operation_times: OperationTimes,
}

impl OrchestratorConfig {
    fn default_port() -> u16 {
        8081
    }

    fn default_task_grace_period_millis() -> u64 {
        DEFAULT_GRACE_PERIOD.as_millis() as u64
    }
}

/// This is the only entry for users to get the rucalc orchestrator.
/// # Return the router for the server
pub fn get_server(scheduler: Arc<Scheduler>) -> Result<Router> {
    let app_state = AppState::new(scheduler);

    let router = Router::new()
        .nest("/api/v1", get_api_router())
        .nest("/internal", get_internal_router())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);
    Ok(router)
}
