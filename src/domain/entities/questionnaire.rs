use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Questionnaire {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Question definitions as the frontend editor produced them.
    pub questions: serde_json::Value,
    /// Random URL-safe token under which the questionnaire is publicly
    /// reachable once published.
    pub public_slug: String,
    pub is_published: bool,
    /// Aggregated response report, filled in by the background report worker.
    pub report: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionnaireResponse {
    pub id: Uuid,
    pub questionnaire_id: Uuid,
    pub answers: serde_json::Value,
    pub submitted_at: NaiveDateTime,
}
