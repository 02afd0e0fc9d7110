use bigdecimal::{BigDecimal, RoundingMode};
use serde::Deserialize;
use utoipa::ToSchema;

// ── Payment status ───────────────────────────────────────────────────────────

/// Payment status of an order. `paid` is terminal for automated
/// reconciliation; `Other` carries an unrecognized raw value verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Other(raw) => raw,
        }
    }

    /// Localized display text; unknown values echo the raw string.
    pub fn text(&self) -> &str {
        match self {
            PaymentStatus::Pending => "Ожидает оплаты",
            PaymentStatus::Paid => "Оплачено",
            PaymentStatus::Failed => "Ошибка оплаты",
            PaymentStatus::Refunded => "Возвращен",
            PaymentStatus::Other(raw) => raw,
        }
    }
}

impl From<&str> for PaymentStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "pending" => PaymentStatus::Pending,
            "paid" => PaymentStatus::Paid,
            "failed" => PaymentStatus::Failed,
            "refunded" => PaymentStatus::Refunded,
            other => PaymentStatus::Other(other.to_string()),
        }
    }
}

/// Map a provider-side payment status onto ours. Anything unrecognized is
/// treated as still pending rather than failing the reconciliation.
pub fn normalize_provider_status(provider_status: &str) -> PaymentStatus {
    match provider_status {
        "succeeded" => PaymentStatus::Paid,
        "canceled" => PaymentStatus::Failed,
        "pending" | "waiting_for_capture" => PaymentStatus::Pending,
        _ => PaymentStatus::Pending,
    }
}

/// The provider expects amounts as strings with exactly two decimal places.
pub fn format_amount(amount: &BigDecimal) -> String {
    amount.with_scale_round(2, RoundingMode::HalfUp).to_string()
}

// ── Payment session ──────────────────────────────────────────────────────────

/// Provider-side payment record created for an order.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    pub id: String,
    pub status: String,
    pub confirmation_url: Option<String>,
}

/// Everything the gateway needs to open a payment session for an order.
#[derive(Debug, Clone)]
pub struct CreatePaymentRequest {
    pub amount: BigDecimal,
    pub currency: String,
    pub return_url: String,
    pub order_id: i32,
    pub order_number: String,
    pub user_id: i32,
}

// ── Webhook events ───────────────────────────────────────────────────────────

/// Incoming provider notification, `{event, object: {id, ...}}`. Fields are
/// optional because the payload is not authenticated and may be malformed.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookEvent {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub object: Option<WebhookObject>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookObject {
    #[serde(default)]
    pub id: Option<String>,
}
