use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

/// Subscription ledger entry: at most one per user. Only the webhook
/// reconciler creates or overwrites these, and only for a `paid` payment.
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Active-survey entitlement; always positive once the row exists.
    pub surveys: i32,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Subscription {
    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        self.expires_at > now
    }
}
