use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::AppResult,
    application::use_cases::questionnaire::QuestionnaireRepo,
    domain::entities::questionnaire::{Questionnaire, QuestionnaireResponse},
};

fn row_to_questionnaire(row: sqlx::postgres::PgRow) -> Questionnaire {
    Questionnaire {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        questions: row.get("questions"),
        public_slug: row.get("public_slug"),
        is_published: row.get("is_published"),
        report: row.get("report"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_response(row: sqlx::postgres::PgRow) -> QuestionnaireResponse {
    QuestionnaireResponse {
        id: row.get("id"),
        questionnaire_id: row.get("questionnaire_id"),
        answers: row.get("answers"),
        submitted_at: row.get("submitted_at"),
    }
}

const SELECT_COLS: &str = "id, user_id, title, description, questions, public_slug, is_published, report, created_at, updated_at";

const RESPONSE_COLS: &str = "id, questionnaire_id, answers, submitted_at";

#[async_trait]
impl QuestionnaireRepo for PostgresPersistence {
    async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        description: Option<&str>,
        questions: &serde_json::Value,
        public_slug: &str,
    ) -> AppResult<Questionnaire> {
        let row = sqlx::query(&format!(
            "INSERT INTO questionnaires (id, user_id, title, description, questions, public_slug)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SELECT_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(questions)
        .bind(public_slug)
        .fetch_one(self.pool())
        .await?;
        Ok(row_to_questionnaire(row))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Questionnaire>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM questionnaires WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_to_questionnaire))
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<Questionnaire>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM questionnaires WHERE public_slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_to_questionnaire))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Questionnaire>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM questionnaires WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_to_questionnaire).collect())
    }

    async fn count_by_user(&self, user_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM questionnaires WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool())
            .await?;
        Ok(row.get("count"))
    }

    async fn update(
        &self,
        id: Uuid,
        title: &str,
        description: Option<&str>,
        questions: &serde_json::Value,
        is_published: bool,
    ) -> AppResult<Questionnaire> {
        let row = sqlx::query(&format!(
            "UPDATE questionnaires
             SET title = $2, description = $3, questions = $4, is_published = $5,
                 updated_at = CURRENT_TIMESTAMP
             WHERE id = $1
             RETURNING {SELECT_COLS}"
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(questions)
        .bind(is_published)
        .fetch_one(self.pool())
        .await?;
        Ok(row_to_questionnaire(row))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM questionnaires WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn save_report(&self, id: Uuid, report: &serde_json::Value) -> AppResult<()> {
        sqlx::query(
            "UPDATE questionnaires SET report = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(report)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn create_response(
        &self,
        questionnaire_id: Uuid,
        answers: &serde_json::Value,
    ) -> AppResult<QuestionnaireResponse> {
        let row = sqlx::query(&format!(
            "INSERT INTO questionnaire_responses (id, questionnaire_id, answers)
             VALUES ($1, $2, $3)
             RETURNING {RESPONSE_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(questionnaire_id)
        .bind(answers)
        .fetch_one(self.pool())
        .await?;
        Ok(row_to_response(row))
    }

    async fn list_responses(
        &self,
        questionnaire_id: Uuid,
    ) -> AppResult<Vec<QuestionnaireResponse>> {
        let rows = sqlx::query(&format!(
            "SELECT {RESPONSE_COLS} FROM questionnaire_responses
             WHERE questionnaire_id = $1
             ORDER BY submitted_at"
        ))
        .bind(questionnaire_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_to_response).collect())
    }

    async fn recent_responses_for_owner(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<QuestionnaireResponse>> {
        let rows = sqlx::query(
            "SELECT qr.id, qr.questionnaire_id, qr.answers, qr.submitted_at
             FROM questionnaire_responses qr
             JOIN questionnaires q ON q.id = qr.questionnaire_id
             WHERE q.user_id = $1
             ORDER BY qr.submitted_at DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_to_response).collect())
    }
}
