use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::AppError,
    schedules::{
        dto::{CreateScheduleRequest, CreatedScheduleResponse, DeleteResponse},
        repo_types::Schedule,
        services,
    },
    state::AppState,
};

pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/schedules", get(list_schedules).post(create_schedule))
        // static segment wins over `:id`
        .route("/schedules/deleteAll", delete(delete_all_schedules))
        .route("/schedules/:id", delete(delete_schedule))
}

#[instrument(skip(state, payload))]
pub async fn create_schedule(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateScheduleRequest>, JsonRejection>,
) -> Result<Json<CreatedScheduleResponse>, AppError> {
    let Json(payload) = payload?;
    let schedule = services::create(state.schedules.as_ref(), user.id, payload).await?;
    Ok(Json(CreatedScheduleResponse {
        message: "Schedule saved".into(),
        schedule,
    }))
}

#[instrument(skip(state))]
pub async fn list_schedules(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Schedule>>, AppError> {
    Ok(Json(state.schedules.list_for_owner(user.id).await?))
}

#[instrument(skip(state))]
pub async fn delete_schedule(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    services::delete_one(state.schedules.as_ref(), user.id, &id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Schedule deleted".into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_all_schedules(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<DeleteResponse>, AppError> {
    services::delete_all(state.schedules.as_ref(), user.id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "All schedules deleted".into(),
    }))
}
