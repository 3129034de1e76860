pub mod admin;
pub mod auth;
pub mod notifications;
pub mod payments;
pub mod questionnaires;
pub mod subscription;
pub mod user;
pub mod webhooks;

use axum::{Router, middleware};

use crate::adapters::http::{app_state::AppState, middleware::auth_middleware};

/// Everything under `/api`. The webhook and public questionnaire routes are
/// unauthenticated; the rest requires a bearer token.
pub fn router(app_state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .merge(auth::router())
        .merge(webhooks::router())
        .merge(questionnaires::public_router());

    let protected = Router::new()
        .merge(user::router())
        .merge(payments::router())
        .merge(subscription::router())
        .merge(questionnaires::router())
        .merge(notifications::router())
        .nest("/admin", admin::router())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    public.merge(protected)
}
