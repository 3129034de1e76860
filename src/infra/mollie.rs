use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_gateway::{
        CheckoutSession, CheckoutSpec, GatewayPayment, PaymentGatewayPort,
    },
};

const MOLLIE_API_BASE: &str = "https://api.mollie.com/v2";

#[derive(Clone)]
pub struct MollieClient {
    client: Client,
    api_key: SecretString,
}

impl MollieClient {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Gateway(format!("Failed to read Mollie response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Mollie API error");
            return Err(AppError::Gateway(format!(
                "Mollie API error: {} - {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Mollie response");
            AppError::Gateway(format!("Failed to parse Mollie response: {}", e))
        })
    }
}

/// Mollie encodes amounts as decimal strings, e.g. `{"currency": "EUR",
/// "value": "24.99"}`.
#[derive(Debug, Serialize)]
struct MollieAmount {
    currency: String,
    value: String,
}

fn format_amount(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentReq<'a> {
    amount: MollieAmount,
    description: &'a str,
    redirect_url: &'a str,
    webhook_url: &'a str,
    metadata: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MolliePayment {
    id: String,
    status: String,
    #[serde(rename = "webhookUrl")]
    webhook_url: Option<String>,
    #[serde(rename = "_links")]
    links: Option<MollieLinks>,
}

#[derive(Debug, Deserialize)]
struct MollieLinks {
    checkout: Option<MollieLink>,
}

#[derive(Debug, Deserialize)]
struct MollieLink {
    href: String,
}

#[async_trait]
impl PaymentGatewayPort for MollieClient {
    async fn create_checkout(&self, spec: &CheckoutSpec) -> AppResult<CheckoutSession> {
        let request = CreatePaymentReq {
            amount: MollieAmount {
                currency: spec.currency.clone(),
                value: format_amount(spec.amount_cents),
            },
            description: &spec.description,
            redirect_url: &spec.redirect_url,
            webhook_url: &spec.webhook_url,
            metadata: &spec.metadata,
        };

        let response = self
            .client
            .post(format!("{}/payments", MOLLIE_API_BASE))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Mollie request failed: {}", e)))?;

        let payment: MolliePayment = self.handle_response(response).await?;
        let checkout_url = payment
            .links
            .and_then(|links| links.checkout)
            .map(|link| link.href)
            .ok_or_else(|| {
                AppError::Gateway(format!("Payment {} has no checkout link", payment.id))
            })?;

        Ok(CheckoutSession {
            external_id: payment.id,
            checkout_url,
        })
    }

    async fn get_payment(&self, external_id: &str) -> AppResult<GatewayPayment> {
        let response = self
            .client
            .get(format!("{}/payments/{}", MOLLIE_API_BASE, external_id))
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Mollie request failed: {}", e)))?;

        let payment: MolliePayment = self.handle_response(response).await?;
        Ok(GatewayPayment {
            external_id: payment.id,
            status: payment.status,
            webhook_url: payment.webhook_url,
        })
    }
}
