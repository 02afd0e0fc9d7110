use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{order_items, orders, products};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: i32,
    pub user_id: i32,
    pub order_number: String,
    pub status: String,
    pub total_amount: BigDecimal,
    pub shipping_amount: BigDecimal,
    pub discount_amount: BigDecimal,
    pub tax_amount: BigDecimal,
    pub currency: String,
    pub shipping_address: Value,
    pub billing_address: Option<Value>,
    pub payment_method: String,
    pub payment_status: String,
    pub shipping_method: Option<String>,
    pub notes: Option<String>,
    pub payment_id: Option<String>,
    pub payment_confirmation_url: Option<String>,
    pub payment_paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub user_id: i32,
    pub order_number: String,
    pub status: String,
    pub total_amount: BigDecimal,
    pub shipping_amount: BigDecimal,
    pub discount_amount: BigDecimal,
    pub tax_amount: BigDecimal,
    pub currency: String,
    pub shipping_address: Value,
    pub billing_address: Option<Value>,
    pub payment_method: String,
    pub payment_status: String,
    pub shipping_method: Option<String>,
    pub notes: Option<String>,
}

/// Payment-column patch. `None` fields are skipped by diesel, so previous
/// values are retained, never nulled out.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct PaymentInfoChangeset {
    pub payment_id: Option<String>,
    pub payment_confirmation_url: Option<String>,
    pub payment_status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub price: BigDecimal,
    pub images: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
