use axum::{
    Json, Router, middleware,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, middleware::require_admin},
    app_error::AppResult,
    domain::entities::user::UserRole,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", put(update_user))
        .layer(middleware::from_fn(require_admin))
}

async fn list_users(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let users = app_state.user_use_cases.list_users().await?;
    Ok(Json(users))
}

#[derive(Deserialize)]
struct UpdateUserRequest {
    role: UserRole,
}

async fn update_user(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let user = app_state
        .user_use_cases
        .update_user_role(id, input.role)
        .await?;
    Ok(Json(user))
}
