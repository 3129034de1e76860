use async_trait::async_trait;

use crate::app_error::AppResult;

/// Request to open a hosted checkout session with the payment processor.
#[derive(Debug, Clone)]
pub struct CheckoutSpec {
    pub amount_cents: i64,
    pub currency: String,
    pub description: String,
    /// Where the processor redirects the customer after checkout.
    pub redirect_url: String,
    /// Where the processor posts status-change notifications.
    pub webhook_url: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Processor-assigned payment id, stored on our payment record.
    pub external_id: String,
    /// Hosted checkout page the customer is sent to.
    pub checkout_url: String,
}

/// The processor's own view of a payment, fetched via poll-back. This is the
/// only source the reconciler trusts for status values.
#[derive(Debug, Clone)]
pub struct GatewayPayment {
    pub external_id: String,
    pub status: String,
    /// The webhook URL the processor has on record for this payment; used to
    /// reject notifications for payments that were not created by us.
    pub webhook_url: Option<String>,
}

/// Payment gateway port. The Mollie client implements this; tests use an
/// in-memory mock.
#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    async fn create_checkout(&self, spec: &CheckoutSpec) -> AppResult<CheckoutSession>;

    async fn get_payment(&self, external_id: &str) -> AppResult<GatewayPayment>;
}
