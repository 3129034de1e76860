use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Months, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::{CheckoutSpec, PaymentGatewayPort},
        use_cases::{notification::NotificationUseCases, user::UserRepo},
    },
    domain::entities::payment::{Payment, PaymentStatus},
};

/// Subscription upsert issued together with a `paid` status write. The two
/// writes share one transaction so a crash can never leave a paid payment
/// without its entitlement.
#[derive(Debug, Clone)]
pub struct EntitlementGrant {
    pub user_id: Uuid,
    pub surveys: i32,
    pub expires_at: NaiveDateTime,
}

#[async_trait]
pub trait PaymentRepo: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        amount_cents: i64,
        surveys: i32,
        is_yearly: bool,
    ) -> AppResult<Payment>;

    /// Writes the external gateway id onto a payment that does not have one
    /// yet. Fails if the payment already carries an external id.
    async fn set_external_id(&self, payment_id: Uuid, external_id: &str) -> AppResult<()>;

    async fn get_by_external_id(&self, external_id: &str) -> AppResult<Option<Payment>>;

    /// Writes the gateway-reported status and, if `grant` is present, upserts
    /// the user's subscription in the same transaction.
    async fn mark_status_and_grant(
        &self,
        payment_id: Uuid,
        status: &str,
        grant: Option<&EntitlementGrant>,
    ) -> AppResult<()>;

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>>;

    async fn latest_paid_by_user(&self, user_id: Uuid) -> AppResult<Option<Payment>>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutInput {
    /// Amount in euros, e.g. `24.99`.
    pub amount: f64,
    pub surveys: i32,
    pub is_yearly: bool,
    pub accepted_terms: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub payment_url: String,
}

#[derive(Clone)]
pub struct PaymentUseCases {
    payments: Arc<dyn PaymentRepo>,
    users: Arc<dyn UserRepo>,
    gateway: Arc<dyn PaymentGatewayPort>,
    notifier: NotificationUseCases,
    /// Where the customer lands after checkout.
    redirect_url: String,
    /// Our registered webhook endpoint; gateway records that declare a
    /// different one are rejected.
    webhook_url: String,
}

impl PaymentUseCases {
    pub fn new(
        payments: Arc<dyn PaymentRepo>,
        users: Arc<dyn UserRepo>,
        gateway: Arc<dyn PaymentGatewayPort>,
        notifier: NotificationUseCases,
        redirect_url: String,
        webhook_url: String,
    ) -> Self {
        Self {
            payments,
            users,
            gateway,
            notifier,
            redirect_url,
            webhook_url,
        }
    }

    /// Opens a hosted checkout session for a subscription purchase. The local
    /// payment record starts as `pending` and only the webhook reconciler
    /// moves it from there.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create_checkout(
        &self,
        user_id: Uuid,
        input: &CreateCheckoutInput,
    ) -> AppResult<CheckoutResponse> {
        if !input.accepted_terms {
            return Err(AppError::InvalidInput(
                "You must accept the terms and conditions".into(),
            ));
        }
        if !(input.amount > 0.0) {
            return Err(AppError::InvalidInput("Amount must be positive".into()));
        }
        if input.surveys < 1 {
            return Err(AppError::InvalidInput(
                "At least one survey must be purchased".into(),
            ));
        }

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let amount_cents = (input.amount * 100.0).round() as i64;
        let payment = self
            .payments
            .create(user_id, amount_cents, input.surveys, input.is_yearly)
            .await?;

        let session = self
            .gateway
            .create_checkout(&CheckoutSpec {
                amount_cents,
                currency: "EUR".into(),
                description: checkout_description(input.surveys, input.is_yearly, &user.name),
                redirect_url: self.redirect_url.clone(),
                webhook_url: self.webhook_url.clone(),
                metadata: json!({ "payment_id": payment.id }),
            })
            .await?;

        self.payments
            .set_external_id(payment.id, &session.external_id)
            .await?;

        info!(payment_id = %payment.id, external_id = %session.external_id, "Checkout session created");
        Ok(CheckoutResponse {
            payment_url: session.checkout_url,
        })
    }

    /// Reconciles an inbound gateway notification. Only the external id from
    /// the notification is used; the authoritative status comes from polling
    /// the gateway back.
    #[instrument(skip(self))]
    pub async fn handle_webhook(&self, external_id: &str) -> AppResult<()> {
        let gateway_payment = self.gateway.get_payment(external_id).await?;

        if gateway_payment.webhook_url.as_deref() != Some(self.webhook_url.as_str()) {
            warn!(
                external_id,
                declared = ?gateway_payment.webhook_url,
                "Webhook for payment with foreign callback URL"
            );
            return Err(AppError::InvalidInput(
                "Payment does not belong to this application".into(),
            ));
        }

        let payment = self
            .payments
            .get_by_external_id(external_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let status = gateway_payment.status.as_str();
        if PaymentStatus::parse(status) == Some(PaymentStatus::Paid) {
            let grant = EntitlementGrant {
                user_id: payment.user_id,
                surveys: payment.surveys,
                expires_at: one_month_from(Utc::now().naive_utc()),
            };
            self.payments
                .mark_status_and_grant(payment.id, status, Some(&grant))
                .await?;
            info!(payment_id = %payment.id, surveys = grant.surveys, "Payment paid, subscription granted");
            self.notifier.dispatch_best_effort(
                payment.user_id,
                "Payment Received",
                "Your payment was received and your subscription is now active.",
            );
        } else {
            self.payments
                .mark_status_and_grant(payment.id, status, None)
                .await?;
            info!(payment_id = %payment.id, status, "Payment status reconciled");
        }
        Ok(())
    }

    pub async fn payment_history(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        self.payments.list_by_user(user_id).await
    }
}

fn checkout_description(surveys: i32, is_yearly: bool, user_name: &str) -> String {
    let cadence = if is_yearly { "Yearly" } else { "Monthly" };
    format!("{} Surveys {} Subscription for {}", surveys, cadence, user_name)
}

/// Entitlement window granted per paid payment. Always one calendar month,
/// independent of the billing cadence flag.
pub fn one_month_from(now: NaiveDateTime) -> NaiveDateTime {
    now.checked_add_months(Months::new(1))
        .unwrap_or(now + TimeDelta::days(30))
}
