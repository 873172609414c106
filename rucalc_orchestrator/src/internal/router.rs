//! Internal API polled by agents: hand out ready tasks and collect their results.

use ::axum::{extract::State, routing::get, Json, Router};
use ::rucalc_common::{
    anyhow::anyhow,
    error::RucalcError,
    task::{TaskResponse, TaskResult},
};

use crate::{error::RucalcServerError, state::AppState};

type Result<T> = std::result::Result<T, RucalcServerError>;

async fn get_task(State(state): State<AppState>) -> Result<Json<TaskResponse>> {
    state
        .get_scheduler()
        .get_task()
        .await
        .map(|task| Json(TaskResponse { task }))
        .ok_or_else(|| RucalcError::not_found(anyhow!("no tasks")).into())
}

async fn put_result(
    State(state): State<AppState>,
    Json(TaskResult { id, value }): Json<TaskResult>,
) -> Result<()> {
    let value = value.trim().parse::<f64>().map_err(|e| {
        RucalcError::invalid_argument(anyhow!(
            "Cannot parse value {:?} of task {}: {}",
            value,
            id,
            e
        ))
    })?;
    state.get_scheduler().put_result(id, value).await?;
    Ok(())
}

pub(crate) fn get_internal_router() -> Router<AppState> {
    Router::new().route("/task", get(get_task).post(put_result))
}
