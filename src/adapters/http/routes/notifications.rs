use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, middleware::AuthUser},
    app_error::AppResult,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list))
        .route("/notifications/{id}/read", put(mark_read))
}

async fn list(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let notifications = app_state.notification_use_cases.list(auth.id).await?;
    Ok(Json(notifications))
}

async fn mark_read(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    app_state
        .notification_use_cases
        .mark_read(auth.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
