use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::payment::{EntitlementGrant, PaymentRepo},
    domain::entities::payment::{Payment, PaymentStatus},
};

fn row_to_payment(row: sqlx::postgres::PgRow) -> Payment {
    Payment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        amount_cents: row.get("amount_cents"),
        surveys: row.get("surveys"),
        is_yearly: row.get("is_yearly"),
        status: row.get("status"),
        mollie_payment_id: row.get("mollie_payment_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str =
    "id, user_id, amount_cents, surveys, is_yearly, status, mollie_payment_id, created_at, updated_at";

#[async_trait]
impl PaymentRepo for PostgresPersistence {
    async fn create(
        &self,
        user_id: Uuid,
        amount_cents: i64,
        surveys: i32,
        is_yearly: bool,
    ) -> AppResult<Payment> {
        let row = sqlx::query(&format!(
            "INSERT INTO payments (id, user_id, amount_cents, surveys, is_yearly, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SELECT_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(amount_cents)
        .bind(surveys)
        .bind(is_yearly)
        .bind(PaymentStatus::PENDING)
        .fetch_one(self.pool())
        .await?;
        Ok(row_to_payment(row))
    }

    async fn set_external_id(&self, payment_id: Uuid, external_id: &str) -> AppResult<()> {
        // Guarded so an already-assigned id can never be overwritten.
        let result = sqlx::query(
            "UPDATE payments
             SET mollie_payment_id = $2, updated_at = CURRENT_TIMESTAMP
             WHERE id = $1 AND mollie_payment_id IS NULL",
        )
        .bind(payment_id)
        .bind(external_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM payments WHERE id = $1")
                .bind(payment_id)
                .fetch_optional(self.pool())
                .await?
                .is_some();
            if exists {
                return Err(AppError::Internal(format!(
                    "Payment {} already has an external id",
                    payment_id
                )));
            }
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn get_by_external_id(&self, external_id: &str) -> AppResult<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM payments WHERE mollie_payment_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_to_payment))
    }

    async fn mark_status_and_grant(
        &self,
        payment_id: Uuid,
        status: &str,
        grant: Option<&EntitlementGrant>,
    ) -> AppResult<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "UPDATE payments SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(payment_id)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        if let Some(grant) = grant {
            sqlx::query(
                "INSERT INTO subscriptions (id, user_id, surveys, expires_at)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (user_id) DO UPDATE
                 SET surveys = EXCLUDED.surveys,
                     expires_at = EXCLUDED.expires_at,
                     updated_at = CURRENT_TIMESTAMP",
            )
            .bind(Uuid::new_v4())
            .bind(grant.user_id)
            .bind(grant.surveys)
            .bind(grant.expires_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM payments WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_to_payment).collect())
    }

    async fn latest_paid_by_user(&self, user_id: Uuid) -> AppResult<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM payments
             WHERE user_id = $1 AND status = 'paid'
             ORDER BY created_at DESC
             LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_to_payment))
    }
}
