use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Context;
use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    /// Public origin of the frontend, used for shareable questionnaire links
    /// and checkout redirects.
    pub app_origin: Url,
    pub cors_origin: HeaderValue,
    pub mollie_api_key: SecretString,
    /// The webhook endpoint registered with every created payment. Payments
    /// whose gateway record declares a different one are rejected.
    pub webhook_url: String,
    pub checkout_redirect_url: String,
    pub resend_api_key: SecretString,
    pub email_from: String,
    pub renewal_window_days: i64,
    pub report_queue_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = SecretString::new(require_env("JWT_SECRET")?.into());
        let database_url = require_env("DATABASE_URL")?;

        let app_origin: Url = require_env("APP_ORIGIN")?
            .parse()
            .context("APP_ORIGIN must be a valid URL")?;
        let cors_origin: HeaderValue = env_or("CORS_ORIGIN", "http://localhost:3000".to_string())
            .parse()
            .context("CORS_ORIGIN must be a valid header value")?;

        let bind_addr: SocketAddr = env_or("BIND_ADDR", "127.0.0.1:3001".parse()?);
        let access_token_ttl_secs: i64 = env_or("ACCESS_TOKEN_TTL_SECS", 86_400);

        let mollie_api_key = SecretString::new(require_env("MOLLIE_API_KEY")?.into());
        let webhook_url = match std::env::var("WEBHOOK_URL") {
            Ok(url) => url,
            Err(_) => app_origin
                .join("api/webhooks/mollie")
                .context("Failed to derive WEBHOOK_URL from APP_ORIGIN")?
                .to_string(),
        };
        let checkout_redirect_url = match std::env::var("CHECKOUT_REDIRECT_URL") {
            Ok(url) => url,
            Err(_) => app_origin
                .join("payment/result")
                .context("Failed to derive CHECKOUT_REDIRECT_URL from APP_ORIGIN")?
                .to_string(),
        };

        let resend_api_key = SecretString::new(require_env("RESEND_API_KEY")?.into());
        let email_from = require_env("EMAIL_FROM")?;

        let renewal_window_days: i64 = env_or("RENEWAL_WINDOW_DAYS", 3);
        let report_queue_capacity: usize = env_or("REPORT_QUEUE_CAPACITY", 64);

        Ok(Self {
            bind_addr,
            database_url,
            jwt_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_secs),
            app_origin,
            cors_origin,
            mollie_api_key,
            webhook_url,
            checkout_redirect_url,
            resend_api_key,
            email_from,
            renewal_window_days,
            report_queue_capacity,
        })
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
