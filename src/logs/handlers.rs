use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::AppError,
    logs::{
        dto::{RecordLogRequest, RecordedLogResponse},
        repo_types::DoseLog,
        services,
    },
    state::AppState,
};

pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/logs", post(record_log))
        .route("/logs/history", get(history))
}

#[instrument(skip(state, payload))]
pub async fn record_log(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<RecordLogRequest>, JsonRejection>,
) -> Result<Json<RecordedLogResponse>, AppError> {
    let Json(payload) = payload?;
    let log = services::record(
        state.logs.as_ref(),
        state.schedules.as_ref(),
        user.id,
        payload,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(Json(RecordedLogResponse {
        message: "Log recorded successfully".into(),
        log,
    }))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<DoseLog>>, AppError> {
    Ok(Json(services::history(state.logs.as_ref(), user.id).await?))
}
