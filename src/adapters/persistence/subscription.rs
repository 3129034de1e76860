use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::AppResult,
    application::use_cases::subscription::SubscriptionRepo,
    domain::entities::subscription::Subscription,
};

fn row_to_subscription(row: sqlx::postgres::PgRow) -> Subscription {
    Subscription {
        id: row.get("id"),
        user_id: row.get("user_id"),
        surveys: row.get("surveys"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = "id, user_id, surveys, expires_at, created_at, updated_at";

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn get_by_user(&self, user_id: Uuid) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM subscriptions WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_to_subscription))
    }

    async fn list_expiring_within(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM subscriptions
             WHERE expires_at <= $1
             ORDER BY expires_at"
        ))
        .bind(cutoff)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_to_subscription).collect())
    }
}
