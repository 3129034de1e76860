//! Test app state builder for HTTP-level integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        jwt,
        use_cases::{
            notification::NotificationUseCases, payment::PaymentUseCases,
            questionnaire::QuestionnaireUseCases, report::ReportUseCases,
            subscription::SubscriptionUseCases, user::UserUseCases,
        },
    },
    domain::entities::user::User,
    infra::{config::AppConfig, report_worker::ReportJobQueue},
    test_utils::{InMemoryEmailSender, InMemoryPersistence, MockPaymentGateway},
};

pub const TEST_WEBHOOK_URL: &str = "https://app.test/api/webhooks/mollie";

/// Builds an `AppState` wired to in-memory mocks. The mocks stay accessible
/// for seeding and assertions after `build()`.
pub struct TestAppStateBuilder {
    pub persistence: Arc<InMemoryPersistence>,
    pub gateway: Arc<MockPaymentGateway>,
    pub email: Arc<InMemoryEmailSender>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            persistence: Arc::new(InMemoryPersistence::new()),
            gateway: Arc::new(MockPaymentGateway::new()),
            email: Arc::new(InMemoryEmailSender::new()),
        }
    }

    /// Bearer token accepted by the auth middleware built from this state.
    pub fn token_for(&self, user: &User) -> String {
        jwt::issue(
            user.id,
            user.role,
            &SecretString::new("test_jwt_secret".into()),
            Duration::hours(24),
        )
        .unwrap()
    }

    pub fn build(&self) -> AppState {
        let config = Arc::new(AppConfig {
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            database_url: String::new(),
            jwt_secret: SecretString::new("test_jwt_secret".into()),
            access_token_ttl: Duration::hours(24),
            app_origin: Url::parse("https://app.test/").unwrap(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            mollie_api_key: SecretString::new("test_mollie_key".into()),
            webhook_url: TEST_WEBHOOK_URL.to_string(),
            checkout_redirect_url: "https://app.test/payment/result".to_string(),
            resend_api_key: SecretString::new("test_resend_key".into()),
            email_from: "noreply@app.test".to_string(),
            renewal_window_days: 3,
            report_queue_capacity: 8,
        });

        let notification_use_cases = NotificationUseCases::new(
            self.persistence.clone(),
            self.persistence.clone(),
            self.email.clone(),
        );
        let user_use_cases = UserUseCases::new(
            self.persistence.clone(),
            config.jwt_secret.clone(),
            config.access_token_ttl,
        );
        let payment_use_cases = PaymentUseCases::new(
            self.persistence.clone(),
            self.persistence.clone(),
            self.gateway.clone(),
            notification_use_cases.clone(),
            config.checkout_redirect_url.clone(),
            config.webhook_url.clone(),
        );
        let subscription_use_cases = SubscriptionUseCases::new(
            self.persistence.clone(),
            self.persistence.clone(),
            self.persistence.clone(),
            self.gateway.clone(),
            notification_use_cases.clone(),
            config.checkout_redirect_url.clone(),
            config.webhook_url.clone(),
            config.renewal_window_days,
        );
        let questionnaire_use_cases = QuestionnaireUseCases::new(
            self.persistence.clone(),
            self.persistence.clone(),
            config.app_origin.clone(),
        );
        let report_jobs = ReportJobQueue::start(
            ReportUseCases::new(self.persistence.clone()),
            config.report_queue_capacity,
        );

        AppState {
            config,
            user_use_cases,
            payment_use_cases,
            subscription_use_cases,
            questionnaire_use_cases,
            notification_use_cases,
            report_jobs,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
