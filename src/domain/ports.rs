use async_trait::async_trait;

use super::errors::DomainError;
use super::order::{CreatedOrder, NewOrder, NewOrderItem, OrderStatus, OrderView, ProductInfo};
use super::payment::{CreatePaymentRequest, PaymentSession, PaymentStatus};

/// Partial update of the payment columns. `None` fields keep their previous
/// value (coalesce semantics) so concurrent writers never clobber unrelated
/// columns.
#[derive(Debug, Clone, Default)]
pub struct PaymentInfoPatch {
    pub payment_id: Option<String>,
    pub payment_confirmation_url: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Persist the order and all of its items in one transaction.
    fn create(&self, order: NewOrder, items: Vec<NewOrderItem>)
        -> Result<CreatedOrder, DomainError>;

    fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError>;

    fn list_by_user(
        &self,
        user_id: i32,
        limit: i64,
        offset: i64,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderView>, DomainError>;

    /// All orders, newest first, together with the total row count.
    fn list_all(
        &self,
        limit: i64,
        offset: i64,
        status: Option<OrderStatus>,
    ) -> Result<(Vec<OrderView>, i64), DomainError>;

    fn update_status(&self, id: i32, status: OrderStatus) -> Result<(), DomainError>;

    fn set_payment_info(&self, order_id: i32, patch: PaymentInfoPatch) -> Result<(), DomainError>;

    /// Mark the order holding this external payment id as paid, stamping
    /// `payment_paid_at` and advancing `pending` orders to `processing`.
    /// Returns the number of rows changed; no matching order and an
    /// already-paid order are both zero-row no-ops.
    fn mark_paid_by_payment_id(&self, payment_id: &str) -> Result<usize, DomainError>;

    /// Mark the order holding this external payment id as failed. An order
    /// already marked paid is left untouched (`paid` is absorbing).
    fn mark_failed_by_payment_id(&self, payment_id: &str) -> Result<usize, DomainError>;
}

pub trait ProductCatalog: Send + Sync + 'static {
    fn find_by_id(&self, id: i32) -> Result<Option<ProductInfo>, DomainError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<PaymentSession, DomainError>;

    async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentSession, DomainError>;
}
