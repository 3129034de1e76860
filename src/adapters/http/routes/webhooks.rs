use axum::{
    Form, Json, Router,
    extract::{Query, State, rejection::FormRejection},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/mollie", post(mollie_webhook))
}

/// Mollie posts `id=<payment id>` form-encoded, but the id is also accepted
/// as a query parameter; the notification carries no status and no
/// signature, so the handler only forwards the id to the reconciler.
#[derive(Deserialize)]
struct MollieWebhookParams {
    id: Option<String>,
}

async fn mollie_webhook(
    State(app_state): State<AppState>,
    Query(query): Query<MollieWebhookParams>,
    form: Result<Form<MollieWebhookParams>, FormRejection>,
) -> AppResult<impl IntoResponse> {
    let id = form
        .ok()
        .and_then(|Form(form)| form.id)
        .or(query.id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing payment id".into()))?;

    app_state.payment_use_cases.handle_webhook(&id).await?;
    Ok(Json(json!({ "status": "processed" })))
}
