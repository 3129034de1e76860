use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::AppResult,
    application::use_cases::notification::NotificationRepo,
    domain::entities::notification::Notification,
};

fn row_to_notification(row: sqlx::postgres::PgRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        subject: row.get("subject"),
        message: row.get("message"),
        read: row.get("read"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = "id, user_id, subject, message, read, created_at";

#[async_trait]
impl NotificationRepo for PostgresPersistence {
    async fn create(&self, user_id: Uuid, subject: &str, message: &str) -> AppResult<Notification> {
        let row = sqlx::query(&format!(
            "INSERT INTO notifications (id, user_id, subject, message)
             VALUES ($1, $2, $3, $4)
             RETURNING {SELECT_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(subject)
        .bind(message)
        .fetch_one(self.pool())
        .await?;
        Ok(row_to_notification(row))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_to_notification))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_to_notification).collect())
    }

    async fn mark_read(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
