use axum::{Extension, Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    adapters::http::{app_state::AppState, middleware::AuthUser},
    app_error::AppResult,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/subscription", get(current_subscription))
}

async fn current_subscription(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state.subscription_use_cases.current(auth.id).await?;
    Ok(Json(subscription))
}
