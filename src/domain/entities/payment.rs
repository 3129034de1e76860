use chrono::NaiveDateTime;
use uuid::Uuid;

/// Known Mollie payment statuses. The `Payment` record itself stores the raw
/// status string the gateway reports, so unknown gateway statuses are
/// preserved verbatim; this enum only drives reconciliation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Open,
    Pending,
    Authorized,
    Paid,
    Failed,
    Expired,
    Canceled,
}

impl PaymentStatus {
    pub const PENDING: &'static str = "pending";

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Open => "open",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(PaymentStatus::Open),
            "pending" => Some(PaymentStatus::Pending),
            "authorized" => Some(PaymentStatus::Authorized),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            "expired" => Some(PaymentStatus::Expired),
            "canceled" => Some(PaymentStatus::Canceled),
            _ => None,
        }
    }
}

/// One checkout attempt. Rows are never deleted; the table is the audit
/// trail of every charge ever initiated.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub surveys: i32,
    pub is_yearly: bool,
    /// Raw gateway status string; `pending` until the reconciler overwrites it.
    pub status: String,
    /// External gateway payment id. Set at most once, right after the
    /// checkout call succeeds, and immutable afterwards.
    pub mollie_payment_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Payment {
    pub fn is_paid(&self) -> bool {
        PaymentStatus::parse(&self.status) == Some(PaymentStatus::Paid)
    }
}
