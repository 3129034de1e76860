use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeDelta, Utc};
use serde_json::json;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::{CheckoutSpec, PaymentGatewayPort},
        use_cases::{notification::NotificationUseCases, payment::PaymentRepo, user::UserRepo},
    },
    domain::entities::subscription::Subscription,
};

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn get_by_user(&self, user_id: Uuid) -> AppResult<Option<Subscription>>;

    /// All subscriptions with `expires_at <= cutoff`, already-expired ones
    /// included.
    async fn list_expiring_within(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Subscription>>;
}

/// Outcome of one renewal sweep. Failures carry the reason so the operator
/// output can show what went wrong per user.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub renewed: Vec<Uuid>,
    pub failed: Vec<(Uuid, String)>,
}

#[derive(Clone)]
pub struct SubscriptionUseCases {
    subscriptions: Arc<dyn SubscriptionRepo>,
    payments: Arc<dyn PaymentRepo>,
    users: Arc<dyn UserRepo>,
    gateway: Arc<dyn PaymentGatewayPort>,
    notifier: NotificationUseCases,
    redirect_url: String,
    webhook_url: String,
    renewal_window_days: i64,
}

impl SubscriptionUseCases {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepo>,
        payments: Arc<dyn PaymentRepo>,
        users: Arc<dyn UserRepo>,
        gateway: Arc<dyn PaymentGatewayPort>,
        notifier: NotificationUseCases,
        redirect_url: String,
        webhook_url: String,
        renewal_window_days: i64,
    ) -> Self {
        Self {
            subscriptions,
            payments,
            users,
            gateway,
            notifier,
            redirect_url,
            webhook_url,
            renewal_window_days,
        }
    }

    pub async fn current(&self, user_id: Uuid) -> AppResult<Subscription> {
        self.subscriptions
            .get_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// One pass over every subscription expiring within the renewal window.
    /// Each entry is charged independently; a failure is recorded and the
    /// sweep moves on. No retry here, still-expiring entries are picked up
    /// again by the next run.
    #[instrument(skip(self))]
    pub async fn renew_expiring(&self) -> AppResult<SweepReport> {
        let cutoff = Utc::now().naive_utc() + TimeDelta::days(self.renewal_window_days);
        let expiring = self.subscriptions.list_expiring_within(cutoff).await?;
        info!(count = expiring.len(), "Renewal sweep started");

        let mut report = SweepReport::default();
        for subscription in expiring {
            match self.renew_one(&subscription).await {
                Ok(()) => {
                    report.renewed.push(subscription.user_id);
                    self.notifier.dispatch_best_effort(
                        subscription.user_id,
                        "Your Subscription Has Been Renewed",
                        "We have issued the renewal charge for your subscription.",
                    );
                }
                Err(e) => {
                    error!(user_id = %subscription.user_id, error = %e, "Renewal failed");
                    report.failed.push((subscription.user_id, e.to_string()));
                }
            }
        }

        info!(
            renewed = report.renewed.len(),
            failed = report.failed.len(),
            "Renewal sweep finished"
        );
        Ok(report)
    }

    /// Clones the user's most recent paid payment into a fresh pending charge.
    async fn renew_one(&self, subscription: &Subscription) -> AppResult<()> {
        let user = self
            .users
            .get_by_id(subscription.user_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let template = self
            .payments
            .latest_paid_by_user(user.id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidInput("No previous paid payment to renew from".into())
            })?;

        let payment = self
            .payments
            .create(
                user.id,
                template.amount_cents,
                template.surveys,
                template.is_yearly,
            )
            .await?;

        let cadence = if template.is_yearly { "Yearly" } else { "Monthly" };
        let session = self
            .gateway
            .create_checkout(&CheckoutSpec {
                amount_cents: template.amount_cents,
                currency: "EUR".into(),
                description: format!(
                    "Renewal: {} Surveys {} Subscription for {}",
                    template.surveys, cadence, user.name
                ),
                redirect_url: self.redirect_url.clone(),
                webhook_url: self.webhook_url.clone(),
                metadata: json!({ "payment_id": payment.id, "renewal": true }),
            })
            .await?;

        self.payments
            .set_external_id(payment.id, &session.external_id)
            .await
    }
}
