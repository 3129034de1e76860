use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::questionnaire::QuestionnaireRepo,
};

/// Builds the aggregated response report for a questionnaire. Runs on the
/// background report worker, never on a request path.
#[derive(Clone)]
pub struct ReportUseCases {
    questionnaires: Arc<dyn QuestionnaireRepo>,
}

impl ReportUseCases {
    pub fn new(questionnaires: Arc<dyn QuestionnaireRepo>) -> Self {
        Self { questionnaires }
    }

    #[instrument(skip(self))]
    pub async fn generate(&self, questionnaire_id: Uuid) -> AppResult<()> {
        let questionnaire = self
            .questionnaires
            .get_by_id(questionnaire_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let responses = self.questionnaires.list_responses(questionnaire.id).await?;

        // Per-question tally of how often each answer value was given.
        let mut tallies: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for response in &responses {
            let Some(answers) = response.answers.as_object() else {
                continue;
            };
            for (question_id, answer) in answers {
                let key = match answer {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                *tallies
                    .entry(question_id.clone())
                    .or_default()
                    .entry(key)
                    .or_default() += 1;
            }
        }

        let report = json!({
            "total_responses": responses.len(),
            "questions": tallies,
            "generated_at": Utc::now().naive_utc(),
        });
        self.questionnaires
            .save_report(questionnaire.id, &report)
            .await?;

        info!(%questionnaire_id, responses = responses.len(), "Report generated");
        Ok(())
    }
}
