//! Restful API for submitting and inspecting expressions.

use ::axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use ::http::StatusCode;
use ::rucalc_common::expression::{CalculateRequest, ExpressionList, ExpressionUnit};

use crate::{error::RucalcServerError, state::AppState};

type Result<T> = std::result::Result<T, RucalcServerError>;

/// Submit an expression for evaluation.
async fn calculate(
    State(state): State<AppState>,
    Json(body): Json<CalculateRequest>,
) -> Result<StatusCode> {
    let CalculateRequest { id, expression } = body;
    state
        .get_scheduler()
        .add_expression(id, expression)
        .await?;
    Ok(StatusCode::CREATED)
}

async fn list_expressions(State(state): State<AppState>) -> Json<ExpressionList> {
    let expressions = state.get_scheduler().list_all().await;
    Json(ExpressionList { expressions })
}

async fn get_expression(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ExpressionUnit>> {
    let expression = state.get_scheduler().find_by_id(&id).await?;
    Ok(Json(ExpressionUnit { expression }))
}

pub(crate) fn get_api_router() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(calculate))
        .route("/expressions", get(list_expressions))
        .route("/expressions/:id", get(get_expression))
}
