use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, middleware::AuthUser},
    app_error::AppResult,
    application::use_cases::questionnaire::{CreateQuestionnaireInput, UpdateQuestionnaireInput},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/questionnaires", post(create).get(list))
        .route(
            "/questionnaires/{id}",
            get(get_one).put(update).delete(delete),
        )
        .route("/questionnaires/{id}/public-url", get(public_url))
        .route("/questionnaires/{id}/report", post(request_report))
        .route("/responses/recent", get(recent_responses))
}

/// Unauthenticated routes for respondents following a shared link.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/public/questionnaires/{slug}", get(public_get))
        .route(
            "/public/questionnaires/{slug}/responses",
            post(public_submit),
        )
}

async fn create(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<CreateQuestionnaireInput>,
) -> AppResult<impl IntoResponse> {
    let questionnaire = app_state
        .questionnaire_use_cases
        .create(auth.id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(questionnaire)))
}

async fn list(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let questionnaires = app_state.questionnaire_use_cases.list(auth.id).await?;
    Ok(Json(questionnaires))
}

async fn get_one(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let questionnaire = app_state.questionnaire_use_cases.get(auth.id, id).await?;
    Ok(Json(questionnaire))
}

async fn update(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateQuestionnaireInput>,
) -> AppResult<impl IntoResponse> {
    let questionnaire = app_state
        .questionnaire_use_cases
        .update(auth.id, id, &input)
        .await?;
    Ok(Json(questionnaire))
}

async fn delete(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    app_state
        .questionnaire_use_cases
        .delete(auth.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct PublicUrlResponse {
    public_url: String,
}

async fn public_url(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let public_url = app_state
        .questionnaire_use_cases
        .public_url(auth.id, id)
        .await?;
    Ok(Json(PublicUrlResponse { public_url }))
}

/// Accepted for background processing; the report lands on the questionnaire
/// record once the worker gets to it.
async fn request_report(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    // Ownership check before anything is enqueued.
    app_state.questionnaire_use_cases.get(auth.id, id).await?;
    app_state.report_jobs.enqueue(id)?;
    Ok(StatusCode::ACCEPTED)
}

async fn recent_responses(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let responses = app_state
        .questionnaire_use_cases
        .recent_responses(auth.id)
        .await?;
    Ok(Json(responses))
}

async fn public_get(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let questionnaire = app_state
        .questionnaire_use_cases
        .public_by_slug(&slug)
        .await?;
    Ok(Json(questionnaire))
}

#[derive(Deserialize)]
struct SubmitResponseRequest {
    answers: serde_json::Value,
}

async fn public_submit(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<SubmitResponseRequest>,
) -> AppResult<impl IntoResponse> {
    let response = app_state
        .questionnaire_use_cases
        .submit_response(&slug, &input.answers)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}
