use std::sync::Arc;

use bigdecimal::BigDecimal;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    generate_order_number, Address, CreatedOrder, NewOrder, NewOrderItem, OrderStatus, OrderView,
    PaymentMethod, Requester, ShippingPolicy,
};
use crate::domain::ports::{OrderRepository, ProductCatalog};

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub items: Vec<OrderItemInput>,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub payment_method: String,
    pub shipping_method: Option<String>,
    pub notes: Option<String>,
}

// ── Service ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    catalog: Arc<dyn ProductCatalog>,
    shipping: ShippingPolicy,
    default_currency: String,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        catalog: Arc<dyn ProductCatalog>,
        default_currency: String,
    ) -> Self {
        Self {
            repo,
            catalog,
            shipping: ShippingPolicy::default(),
            default_currency,
        }
    }

    pub fn with_shipping_policy(mut self, shipping: ShippingPolicy) -> Self {
        self.shipping = shipping;
        self
    }

    /// Create an order from cart contents. Prices come from the catalog, not
    /// the client; all validation happens before anything is written.
    pub fn create_order(
        &self,
        user_id: i32,
        input: CreateOrderInput,
    ) -> Result<CreatedOrder, DomainError> {
        if input.items.is_empty() {
            return Err(DomainError::Validation(
                "Заказ не содержит товаров".to_string(),
            ));
        }
        let payment_method = PaymentMethod::parse(&input.payment_method)?;
        input.shipping_address.validate()?;

        let mut subtotal = BigDecimal::from(0);
        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            if item.quantity < 1 {
                return Err(DomainError::Validation(
                    "Количество должно быть положительным числом".to_string(),
                ));
            }
            let product = self
                .catalog
                .find_by_id(item.product_id)?
                .filter(|p| p.is_active)
                .ok_or(DomainError::ProductNotFound(item.product_id))?;

            let total = &product.price * BigDecimal::from(item.quantity);
            subtotal += &total;
            items.push(NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: product.price,
                total,
            });
        }

        let shipping_amount = self
            .shipping
            .quote(&subtotal, input.shipping_method.as_deref());

        let billing_address = input
            .billing_address
            .as_ref()
            .unwrap_or(&input.shipping_address);

        let order = NewOrder {
            user_id,
            order_number: generate_order_number(),
            total_amount: &subtotal + &shipping_amount,
            shipping_amount,
            discount_amount: BigDecimal::from(0),
            tax_amount: BigDecimal::from(0),
            currency: self.default_currency.clone(),
            shipping_address: serde_json::to_value(&input.shipping_address)
                .map_err(|e| DomainError::Internal(e.to_string()))?,
            billing_address: serde_json::to_value(billing_address)
                .map_err(|e| DomainError::Internal(e.to_string()))?,
            payment_method,
            shipping_method: input.shipping_method.clone(),
            notes: input.notes.clone(),
        };

        self.repo.create(order, items)
    }

    /// Full order view including items; only the owner or an admin may read it.
    pub fn get_order(&self, requester: Requester, id: i32) -> Result<OrderView, DomainError> {
        let order = self
            .repo
            .find_by_id(id)?
            .ok_or(DomainError::OrderNotFound)?;
        if !requester.can_access_order(order.user_id) {
            return Err(DomainError::Forbidden);
        }
        Ok(order)
    }

    pub fn list_my_orders(
        &self,
        user_id: i32,
        limit: i64,
        offset: i64,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderView>, DomainError> {
        self.repo.list_by_user(user_id, limit, offset, status)
    }

    pub fn list_all_orders(
        &self,
        limit: i64,
        offset: i64,
        status: Option<OrderStatus>,
    ) -> Result<(Vec<OrderView>, i64), DomainError> {
        self.repo.list_all(limit, offset, status)
    }

    /// Set the order status. Transition legality is deliberately not checked;
    /// any of the known statuses may be set in any order.
    pub fn update_status(&self, id: i32, status: OrderStatus) -> Result<(), DomainError> {
        self.repo.update_status(id, status)
    }
}
