use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{
        email::resend::ResendEmailSender, http::app_state::AppState,
        persistence::PostgresPersistence,
    },
    application::use_cases::{
        notification::NotificationUseCases,
        payment::PaymentUseCases,
        questionnaire::QuestionnaireUseCases,
        report::ReportUseCases,
        subscription::SubscriptionUseCases,
        user::UserUseCases,
    },
    infra::{
        config::AppConfig, db::init_db, mollie::MollieClient, report_worker::ReportJobQueue,
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;

    let pool = init_db(&config.database_url).await?;
    let persistence = Arc::new(PostgresPersistence::new(pool));

    let email = Arc::new(ResendEmailSender::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
    ));
    let gateway = Arc::new(MollieClient::new(config.mollie_api_key.clone()));

    let notification_use_cases = NotificationUseCases::new(
        persistence.clone(),
        persistence.clone(),
        email,
    );
    let user_use_cases = UserUseCases::new(
        persistence.clone(),
        config.jwt_secret.clone(),
        config.access_token_ttl,
    );
    let payment_use_cases = PaymentUseCases::new(
        persistence.clone(),
        persistence.clone(),
        gateway.clone(),
        notification_use_cases.clone(),
        config.checkout_redirect_url.clone(),
        config.webhook_url.clone(),
    );
    let subscription_use_cases = SubscriptionUseCases::new(
        persistence.clone(),
        persistence.clone(),
        persistence.clone(),
        gateway,
        notification_use_cases.clone(),
        config.checkout_redirect_url.clone(),
        config.webhook_url.clone(),
        config.renewal_window_days,
    );
    let questionnaire_use_cases = QuestionnaireUseCases::new(
        persistence.clone(),
        persistence.clone(),
        config.app_origin.clone(),
    );

    let report_jobs = ReportJobQueue::start(
        ReportUseCases::new(persistence),
        config.report_queue_capacity,
    );

    Ok(AppState {
        config: Arc::new(config),
        user_use_cases,
        payment_use_cases,
        subscription_use_cases,
        questionnaire_use_cases,
        notification_use_cases,
        report_jobs,
    })
}

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "webwizard=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let registry = tracing_subscriber::registry().with(filter).with(console_layer);
    match File::create("app.log") {
        Ok(file) => {
            let json_layer = fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true);
            registry.with(json_layer).try_init().ok();
        }
        Err(_) => {
            registry.try_init().ok();
        }
    }
}
