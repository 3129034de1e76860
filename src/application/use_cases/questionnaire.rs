use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::subscription::SubscriptionRepo,
    domain::entities::questionnaire::{Questionnaire, QuestionnaireResponse},
};

/// Questionnaire ceiling for users without an active subscription.
const FREE_QUESTIONNAIRE_LIMIT: i64 = 1;

const RECENT_RESPONSES_LIMIT: i64 = 20;

#[async_trait]
pub trait QuestionnaireRepo: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        description: Option<&str>,
        questions: &serde_json::Value,
        public_slug: &str,
    ) -> AppResult<Questionnaire>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Questionnaire>>;
    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<Questionnaire>>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Questionnaire>>;
    async fn count_by_user(&self, user_id: Uuid) -> AppResult<i64>;

    async fn update(
        &self,
        id: Uuid,
        title: &str,
        description: Option<&str>,
        questions: &serde_json::Value,
        is_published: bool,
    ) -> AppResult<Questionnaire>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn save_report(&self, id: Uuid, report: &serde_json::Value) -> AppResult<()>;

    async fn create_response(
        &self,
        questionnaire_id: Uuid,
        answers: &serde_json::Value,
    ) -> AppResult<QuestionnaireResponse>;

    async fn list_responses(
        &self,
        questionnaire_id: Uuid,
    ) -> AppResult<Vec<QuestionnaireResponse>>;

    /// Latest responses across every questionnaire the user owns.
    async fn recent_responses_for_owner(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<QuestionnaireResponse>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestionnaireInput {
    pub title: String,
    pub description: Option<String>,
    pub questions: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuestionnaireInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub questions: Option<serde_json::Value>,
    pub is_published: Option<bool>,
}

/// Questionnaire as the public (unauthenticated) endpoints expose it: no
/// owner id, no internal flags.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestionnaire {
    pub title: String,
    pub description: Option<String>,
    pub questions: serde_json::Value,
}

#[derive(Clone)]
pub struct QuestionnaireUseCases {
    questionnaires: Arc<dyn QuestionnaireRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
    /// Public origin of the deployment, for building shareable links.
    app_origin: Url,
}

impl QuestionnaireUseCases {
    pub fn new(
        questionnaires: Arc<dyn QuestionnaireRepo>,
        subscriptions: Arc<dyn SubscriptionRepo>,
        app_origin: Url,
    ) -> Self {
        Self {
            questionnaires,
            subscriptions,
            app_origin,
        }
    }

    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create(
        &self,
        user_id: Uuid,
        input: &CreateQuestionnaireInput,
    ) -> AppResult<Questionnaire> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title is required".into()));
        }

        let limit = self.entitlement_limit(user_id).await?;
        let owned = self.questionnaires.count_by_user(user_id).await?;
        if owned >= limit {
            return Err(AppError::InvalidInput(format!(
                "Your plan allows at most {} questionnaire(s)",
                limit
            )));
        }

        self.questionnaires
            .create(
                user_id,
                title,
                input.description.as_deref(),
                &input.questions,
                &generate_slug(),
            )
            .await
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Questionnaire>> {
        self.questionnaires.list_by_user(user_id).await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<Questionnaire> {
        self.owned(user_id, id).await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: &UpdateQuestionnaireInput,
    ) -> AppResult<Questionnaire> {
        let existing = self.owned(user_id, id).await?;

        let title = input
            .title
            .as_deref()
            .map(str::trim)
            .unwrap_or(&existing.title);
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title is required".into()));
        }
        let description = input
            .description
            .as_deref()
            .or(existing.description.as_deref());
        let questions = input.questions.as_ref().unwrap_or(&existing.questions);
        let is_published = input.is_published.unwrap_or(existing.is_published);

        self.questionnaires
            .update(id, title, description, questions, is_published)
            .await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        self.owned(user_id, id).await?;
        self.questionnaires.delete(id).await
    }

    /// Shareable link under which a published questionnaire is reachable.
    pub async fn public_url(&self, user_id: Uuid, id: Uuid) -> AppResult<String> {
        let questionnaire = self.owned(user_id, id).await?;
        let url = self
            .app_origin
            .join(&format!("q/{}", questionnaire.public_slug))
            .map_err(|e| AppError::Internal(format!("Failed to build public URL: {}", e)))?;
        Ok(url.to_string())
    }

    pub async fn public_by_slug(&self, slug: &str) -> AppResult<PublicQuestionnaire> {
        let questionnaire = self.published_by_slug(slug).await?;
        Ok(PublicQuestionnaire {
            title: questionnaire.title,
            description: questionnaire.description,
            questions: questionnaire.questions,
        })
    }

    pub async fn submit_response(
        &self,
        slug: &str,
        answers: &serde_json::Value,
    ) -> AppResult<QuestionnaireResponse> {
        let questionnaire = self.published_by_slug(slug).await?;
        self.questionnaires
            .create_response(questionnaire.id, answers)
            .await
    }

    pub async fn recent_responses(&self, user_id: Uuid) -> AppResult<Vec<QuestionnaireResponse>> {
        self.questionnaires
            .recent_responses_for_owner(user_id, RECENT_RESPONSES_LIMIT)
            .await
    }

    async fn owned(&self, user_id: Uuid, id: Uuid) -> AppResult<Questionnaire> {
        let questionnaire = self
            .questionnaires
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        if questionnaire.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        Ok(questionnaire)
    }

    async fn published_by_slug(&self, slug: &str) -> AppResult<Questionnaire> {
        let questionnaire = self
            .questionnaires
            .get_by_slug(slug)
            .await?
            .ok_or(AppError::NotFound)?;
        if !questionnaire.is_published {
            return Err(AppError::NotFound);
        }
        Ok(questionnaire)
    }

    async fn entitlement_limit(&self, user_id: Uuid) -> AppResult<i64> {
        let now = Utc::now().naive_utc();
        Ok(match self.subscriptions.get_by_user(user_id).await? {
            Some(subscription) if subscription.is_active(now) => i64::from(subscription.surveys),
            _ => FREE_QUESTIONNAIRE_LIMIT,
        })
    }
}

fn generate_slug() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
