use std::sync::Arc;

use crate::{
    application::use_cases::{
        notification::NotificationUseCases, payment::PaymentUseCases,
        questionnaire::QuestionnaireUseCases, subscription::SubscriptionUseCases,
        user::UserUseCases,
    },
    infra::{config::AppConfig, report_worker::ReportJobQueue},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub user_use_cases: UserUseCases,
    pub payment_use_cases: PaymentUseCases,
    pub subscription_use_cases: SubscriptionUseCases,
    pub questionnaire_use_cases: QuestionnaireUseCases,
    pub notification_use_cases: NotificationUseCases,
    pub report_jobs: ReportJobQueue,
}
