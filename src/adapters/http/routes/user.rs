use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;

use crate::{
    adapters::http::{app_state::AppState, middleware::AuthUser},
    app_error::AppResult,
    application::use_cases::user::UpdateProfileInput,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", get(get_profile).put(update_profile))
        .route("/user/password", put(change_password))
}

async fn get_profile(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let profile = app_state.user_use_cases.profile(auth.id).await?;
    Ok(Json(profile))
}

async fn update_profile(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<impl IntoResponse> {
    let profile = app_state
        .user_use_cases
        .update_profile(auth.id, &input)
        .await?;
    Ok(Json(profile))
}

#[derive(Deserialize)]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

async fn change_password(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    app_state
        .user_use_cases
        .change_password(auth.id, &input.current_password, &input.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
