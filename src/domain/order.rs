use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::DomainError;
use super::payment::PaymentStatus;

// ── Order status ─────────────────────────────────────────────────────────────

/// Lifecycle status of an order. Unknown raw values are carried verbatim in
/// `Other` so the admin UI can surface them instead of hiding them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(raw) => raw,
        }
    }

    /// Localized display text; unknown values echo the raw string.
    pub fn text(&self) -> &str {
        match self {
            OrderStatus::Pending => "Ожидает подтверждения",
            OrderStatus::Processing => "Подтвержден",
            OrderStatus::Shipped => "Отправлен",
            OrderStatus::Delivered => "Доставлен",
            OrderStatus::Cancelled => "Отменен",
            OrderStatus::Other(raw) => raw,
        }
    }

    /// Parse a status that must be one of the five known values.
    pub fn parse_known(raw: &str) -> Result<Self, DomainError> {
        match OrderStatus::from(raw) {
            OrderStatus::Other(_) => Err(DomainError::Validation(
                "Неверный статус заказа".to_string(),
            )),
            status => Ok(status),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "pending" => OrderStatus::Pending,
            "processing" => OrderStatus::Processing,
            "shipped" => OrderStatus::Shipped,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            other => OrderStatus::Other(other.to_string()),
        }
    }
}

// ── Payment method ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Card,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "card" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(DomainError::PaymentMethodInvalid(other.to_string())),
        }
    }
}

// ── Addresses ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Address {
    /// A shipping address with any required field missing fails fast,
    /// before anything is persisted.
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("address", &self.address),
            ("city", &self.city),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::Validation(format!(
                    "Адрес доставки: не заполнено поле {field}"
                )));
            }
        }
        Ok(())
    }
}

// ── Requester identity ───────────────────────────────────────────────────────

/// The authenticated caller as the application layer sees it. Admins bypass
/// ownership checks everywhere in this subsystem.
#[derive(Debug, Clone, Copy)]
pub struct Requester {
    pub user_id: i32,
    pub is_admin: bool,
}

impl Requester {
    pub fn can_access_order(&self, owner_id: i32) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}

// ── Shipping policy ──────────────────────────────────────────────────────────

/// Centralized shipping-cost rule: express delivery always costs the express
/// fee, otherwise shipping is free above the threshold and the standard fee
/// below it.
#[derive(Debug, Clone)]
pub struct ShippingPolicy {
    pub standard_fee: BigDecimal,
    pub express_fee: BigDecimal,
    pub free_shipping_threshold: BigDecimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            standard_fee: BigDecimal::from(500),
            express_fee: BigDecimal::from(1000),
            free_shipping_threshold: BigDecimal::from(10_000),
        }
    }
}

impl ShippingPolicy {
    pub fn quote(&self, subtotal: &BigDecimal, shipping_method: Option<&str>) -> BigDecimal {
        if shipping_method == Some("express") {
            self.express_fee.clone()
        } else if *subtotal >= self.free_shipping_threshold {
            BigDecimal::from(0)
        } else {
            self.standard_fee.clone()
        }
    }
}

// ── Order number ─────────────────────────────────────────────────────────────

/// `ORD-<millis>-<3-digit suffix>`. Uniqueness rests on the timestamp plus a
/// random suffix and the database unique constraint; there is no retry on
/// conflict.
pub fn generate_order_number() -> String {
    let timestamp = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("ORD-{timestamp}-{suffix:03}")
}

// ── Write models ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i32,
    pub order_number: String,
    pub total_amount: BigDecimal,
    pub shipping_amount: BigDecimal,
    pub discount_amount: BigDecimal,
    pub tax_amount: BigDecimal,
    pub currency: String,
    pub shipping_address: Value,
    pub billing_address: Value,
    pub payment_method: PaymentMethod,
    pub shipping_method: Option<String>,
    pub notes: Option<String>,
}

/// Line item captured at order creation. `price` is a snapshot of the
/// product price at purchase time and is never recomputed.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub id: i32,
    pub order_number: String,
}

// ── Read models ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_images: Vec<String>,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub user_id: i32,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub shipping_amount: BigDecimal,
    pub discount_amount: BigDecimal,
    pub tax_amount: BigDecimal,
    pub currency: String,
    pub shipping_address: Value,
    pub billing_address: Option<Value>,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub payment_confirmation_url: Option<String>,
    pub payment_paid_at: Option<DateTime<Utc>>,
    pub shipping_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone)]
pub struct ProductInfo {
    pub id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub price: BigDecimal,
    pub images: Vec<String>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_matches_expected_shape() {
        let number = generate_order_number();
        let mut parts = number.splitn(3, '-');
        assert_eq!(parts.next(), Some("ORD"));
        let timestamp = parts.next().expect("timestamp part");
        let suffix = parts.next().expect("suffix part");
        assert!(!timestamp.is_empty());
        assert!(timestamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), 3);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn status_texts_are_localized() {
        assert_eq!(OrderStatus::Pending.text(), "Ожидает подтверждения");
        assert_eq!(OrderStatus::Processing.text(), "Подтвержден");
        assert_eq!(OrderStatus::Shipped.text(), "Отправлен");
        assert_eq!(OrderStatus::Delivered.text(), "Доставлен");
        assert_eq!(OrderStatus::Cancelled.text(), "Отменен");
    }

    #[test]
    fn unknown_status_text_echoes_raw_value() {
        let status = OrderStatus::from("on_hold");
        assert_eq!(status.text(), "on_hold");
        assert_eq!(status.as_str(), "on_hold");
    }

    #[test]
    fn parse_known_rejects_unknown_status() {
        assert!(OrderStatus::parse_known("shipped").is_ok());
        assert!(matches!(
            OrderStatus::parse_known("on_hold"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn payment_method_accepts_card_and_cash_only() {
        assert_eq!(PaymentMethod::parse("card").unwrap(), PaymentMethod::Card);
        assert_eq!(PaymentMethod::parse("cash").unwrap(), PaymentMethod::Cash);
        assert!(matches!(
            PaymentMethod::parse("crypto"),
            Err(DomainError::PaymentMethodInvalid(_))
        ));
    }

    #[test]
    fn shipping_is_standard_fee_below_threshold() {
        let policy = ShippingPolicy::default();
        assert_eq!(
            policy.quote(&BigDecimal::from(1000), None),
            BigDecimal::from(500)
        );
    }

    #[test]
    fn shipping_is_free_at_threshold_and_above() {
        let policy = ShippingPolicy::default();
        assert_eq!(
            policy.quote(&BigDecimal::from(10_000), Some("standard")),
            BigDecimal::from(0)
        );
        assert_eq!(
            policy.quote(&BigDecimal::from(12_000), Some("standard")),
            BigDecimal::from(0)
        );
    }

    #[test]
    fn express_shipping_ignores_the_threshold() {
        let policy = ShippingPolicy::default();
        assert_eq!(
            policy.quote(&BigDecimal::from(50_000), Some("express")),
            BigDecimal::from(1000)
        );
    }

    #[test]
    fn address_requires_name_street_and_city() {
        let mut address = Address {
            first_name: "Иван".to_string(),
            last_name: "Петров".to_string(),
            address: "ул. Ленина, 1".to_string(),
            city: "Москва".to_string(),
            postal_code: None,
            phone: None,
        };
        assert!(address.validate().is_ok());

        address.city = "  ".to_string();
        assert!(matches!(
            address.validate(),
            Err(DomainError::Validation(_))
        ));
    }
}
