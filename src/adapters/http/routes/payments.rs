use axum::{
    Extension, Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    adapters::http::{app_state::AppState, middleware::AuthUser},
    app_error::AppResult,
    application::use_cases::payment::CreateCheckoutInput,
    domain::entities::payment::Payment,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", post(create_checkout))
        .route("/payments/history", get(payment_history))
}

async fn create_checkout(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<CreateCheckoutInput>,
) -> AppResult<impl IntoResponse> {
    let response = app_state
        .payment_use_cases
        .create_checkout(auth.id, &input)
        .await?;
    Ok(Json(response))
}

#[derive(Serialize)]
struct PaymentHistoryEntry {
    id: uuid::Uuid,
    amount_cents: i64,
    surveys: i32,
    is_yearly: bool,
    status: String,
    created_at: chrono::NaiveDateTime,
}

impl From<Payment> for PaymentHistoryEntry {
    fn from(payment: Payment) -> Self {
        PaymentHistoryEntry {
            id: payment.id,
            amount_cents: payment.amount_cents,
            surveys: payment.surveys,
            is_yearly: payment.is_yearly,
            status: payment.status,
            created_at: payment.created_at,
        }
    }
}

async fn payment_history(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let payments = app_state.payment_use_cases.payment_history(auth.id).await?;
    let entries: Vec<PaymentHistoryEntry> =
        payments.into_iter().map(PaymentHistoryEntry::from).collect();
    Ok(Json(entries))
}
