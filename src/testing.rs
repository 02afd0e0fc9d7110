//! In-memory implementations of the ports for service and handler tests.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use jsonwebtoken::{encode, DecodingKey, EncodingKey, Header};

use crate::application::order_service::OrderService;
use crate::application::payment_service::PaymentService;
use crate::auth::Claims;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    Address, CreatedOrder, NewOrder, NewOrderItem, OrderItemView, OrderStatus, OrderView,
    ProductInfo,
};
use crate::domain::payment::{CreatePaymentRequest, PaymentSession, PaymentStatus};
use crate::domain::ports::{
    OrderRepository, PaymentGateway, PaymentInfoPatch, ProductCatalog,
};

pub const TEST_JWT_SECRET: &[u8] = b"unit-test-secret";

/// `Bearer <jwt>` header value signed with the test secret.
pub fn mint_token(user_id: i32, role: &str) -> String {
    let claims = Claims {
        id: user_id,
        role: role.to_string(),
        exp: Utc::now().timestamp() + 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET),
    )
    .expect("token encoding failed");
    format!("Bearer {token}")
}

/// Application state wired to in-memory ports.
pub fn test_state(
    repo: Arc<dyn OrderRepository>,
    catalog: FixedCatalog,
    gateway: Arc<dyn PaymentGateway>,
) -> crate::AppState {
    crate::AppState {
        orders: OrderService::new(repo.clone(), Arc::new(catalog), "RUB".to_string()),
        payments: PaymentService::new(repo, gateway, "http://localhost:3001".to_string()),
        jwt_decoding_key: DecodingKey::from_secret(TEST_JWT_SECRET),
    }
}

pub fn test_address() -> Address {
    Address {
        first_name: "Иван".to_string(),
        last_name: "Петров".to_string(),
        address: "ул. Ленина, 1".to_string(),
        city: "Москва".to_string(),
        postal_code: Some("101000".to_string()),
        phone: None,
    }
}

/// A pending order owned by `user_id` with the given grand total.
pub fn seeded_order(user_id: i32, total: &str) -> OrderView {
    let now = Utc::now();
    let address = serde_json::to_value(test_address()).unwrap();
    OrderView {
        id: 0,
        user_id,
        order_number: crate::domain::order::generate_order_number(),
        status: OrderStatus::Pending,
        total_amount: BigDecimal::from_str(total).unwrap(),
        shipping_amount: BigDecimal::from(0),
        discount_amount: BigDecimal::from(0),
        tax_amount: BigDecimal::from(0),
        currency: "RUB".to_string(),
        shipping_address: address.clone(),
        billing_address: Some(address),
        payment_method: "card".to_string(),
        payment_status: PaymentStatus::Pending,
        payment_id: None,
        payment_confirmation_url: None,
        payment_paid_at: None,
        shipping_method: None,
        notes: None,
        created_at: now,
        updated_at: now,
        items: vec![],
    }
}

// ── Order store fake ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<OrderView>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, mut order: OrderView) -> i32 {
        let mut orders = self.orders.lock().unwrap();
        let id = orders.len() as i32 + 1;
        order.id = id;
        orders.push(order);
        id
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<CreatedOrder, DomainError> {
        let now = Utc::now();
        let mut orders = self.orders.lock().unwrap();
        let id = orders.len() as i32 + 1;
        let item_views = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| OrderItemView {
                id: i as i32 + 1,
                product_id: item.product_id,
                product_name: format!("product-{}", item.product_id),
                product_sku: None,
                product_images: vec![],
                quantity: item.quantity,
                price: item.price,
                total: item.total,
            })
            .collect();
        let order_number = order.order_number.clone();
        orders.push(OrderView {
            id,
            user_id: order.user_id,
            order_number: order.order_number,
            status: OrderStatus::Pending,
            total_amount: order.total_amount,
            shipping_amount: order.shipping_amount,
            discount_amount: order.discount_amount,
            tax_amount: order.tax_amount,
            currency: order.currency,
            shipping_address: order.shipping_address,
            billing_address: Some(order.billing_address),
            payment_method: order.payment_method.as_str().to_string(),
            payment_status: PaymentStatus::Pending,
            payment_id: None,
            payment_confirmation_url: None,
            payment_paid_at: None,
            shipping_method: order.shipping_method,
            notes: order.notes,
            created_at: now,
            updated_at: now,
            items: item_views,
        });
        Ok(CreatedOrder { id, order_number })
    }

    fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    fn list_by_user(
        &self,
        user_id: i32,
        limit: i64,
        offset: i64,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderView>, DomainError> {
        let orders = self.orders.lock().unwrap();
        Ok(orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .filter(|o| status.as_ref().map_or(true, |s| &o.status == s))
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn list_all(
        &self,
        limit: i64,
        offset: i64,
        status: Option<OrderStatus>,
    ) -> Result<(Vec<OrderView>, i64), DomainError> {
        let orders = self.orders.lock().unwrap();
        let matching: Vec<OrderView> = orders
            .iter()
            .filter(|o| status.as_ref().map_or(true, |s| &o.status == s))
            .rev()
            .cloned()
            .collect();
        let total = matching.len() as i64;
        Ok((
            matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
            total,
        ))
    }

    fn update_status(&self, id: i32, status: OrderStatus) -> Result<(), DomainError> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(order) = orders.iter_mut().find(|o| o.id == id) {
            order.status = status;
            order.updated_at = Utc::now();
        }
        Ok(())
    }

    fn set_payment_info(&self, order_id: i32, patch: PaymentInfoPatch) -> Result<(), DomainError> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(order) = orders.iter_mut().find(|o| o.id == order_id) {
            if let Some(payment_id) = patch.payment_id {
                order.payment_id = Some(payment_id);
            }
            if let Some(url) = patch.payment_confirmation_url {
                order.payment_confirmation_url = Some(url);
            }
            if let Some(status) = patch.payment_status {
                order.payment_status = status;
            }
            order.updated_at = Utc::now();
        }
        Ok(())
    }

    fn mark_paid_by_payment_id(&self, payment_id: &str) -> Result<usize, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders
            .iter_mut()
            .find(|o| o.payment_id.as_deref() == Some(payment_id))
        else {
            return Ok(0);
        };
        if order.payment_status == PaymentStatus::Paid {
            return Ok(0);
        }
        order.payment_status = PaymentStatus::Paid;
        order.payment_paid_at = Some(Utc::now());
        if order.status == OrderStatus::Pending {
            order.status = OrderStatus::Processing;
        }
        order.updated_at = Utc::now();
        Ok(1)
    }

    fn mark_failed_by_payment_id(&self, payment_id: &str) -> Result<usize, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders
            .iter_mut()
            .find(|o| o.payment_id.as_deref() == Some(payment_id))
        else {
            return Ok(0);
        };
        if order.payment_status == PaymentStatus::Paid {
            return Ok(0);
        }
        order.payment_status = PaymentStatus::Failed;
        order.updated_at = Utc::now();
        Ok(1)
    }
}

/// Repository whose every call fails, for exercising degraded paths.
pub struct FailingOrderRepository;

impl OrderRepository for FailingOrderRepository {
    fn create(&self, _: NewOrder, _: Vec<NewOrderItem>) -> Result<CreatedOrder, DomainError> {
        Err(DomainError::Internal("store unavailable".to_string()))
    }

    fn find_by_id(&self, _: i32) -> Result<Option<OrderView>, DomainError> {
        Err(DomainError::Internal("store unavailable".to_string()))
    }

    fn list_by_user(
        &self,
        _: i32,
        _: i64,
        _: i64,
        _: Option<OrderStatus>,
    ) -> Result<Vec<OrderView>, DomainError> {
        Err(DomainError::Internal("store unavailable".to_string()))
    }

    fn list_all(
        &self,
        _: i64,
        _: i64,
        _: Option<OrderStatus>,
    ) -> Result<(Vec<OrderView>, i64), DomainError> {
        Err(DomainError::Internal("store unavailable".to_string()))
    }

    fn update_status(&self, _: i32, _: OrderStatus) -> Result<(), DomainError> {
        Err(DomainError::Internal("store unavailable".to_string()))
    }

    fn set_payment_info(&self, _: i32, _: PaymentInfoPatch) -> Result<(), DomainError> {
        Err(DomainError::Internal("store unavailable".to_string()))
    }

    fn mark_paid_by_payment_id(&self, _: &str) -> Result<usize, DomainError> {
        Err(DomainError::Internal("store unavailable".to_string()))
    }

    fn mark_failed_by_payment_id(&self, _: &str) -> Result<usize, DomainError> {
        Err(DomainError::Internal("store unavailable".to_string()))
    }
}

// ── Catalog fake ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FixedCatalog {
    products: HashMap<i32, ProductInfo>,
}

impl FixedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, id: i32, price: &str) -> Self {
        self.products.insert(
            id,
            ProductInfo {
                id,
                name: format!("product-{id}"),
                sku: Some(format!("SKU-{id}")),
                price: BigDecimal::from_str(price).unwrap(),
                images: vec![],
                is_active: true,
            },
        );
        self
    }

    pub fn with_inactive_product(mut self, id: i32, price: &str) -> Self {
        self = self.with_product(id, price);
        self.products.get_mut(&id).unwrap().is_active = false;
        self
    }
}

impl ProductCatalog for FixedCatalog {
    fn find_by_id(&self, id: i32) -> Result<Option<ProductInfo>, DomainError> {
        Ok(self.products.get(&id).cloned())
    }
}

// ── Gateway fake ─────────────────────────────────────────────────────────────

/// Scripted payment gateway: answers `create_payment` and `fetch_payment`
/// with canned responses and counts the calls it receives.
pub struct ScriptedGateway {
    create_response: Option<PaymentSession>,
    fetch_status: Option<String>,
    create_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    last_create: Mutex<Option<CreatePaymentRequest>>,
}

impl ScriptedGateway {
    pub fn creating(payment_id: &str, confirmation_url: &str) -> Self {
        Self {
            create_response: Some(PaymentSession {
                id: payment_id.to_string(),
                status: "pending".to_string(),
                confirmation_url: Some(confirmation_url.to_string()),
            }),
            fetch_status: Some("pending".to_string()),
            create_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            last_create: Mutex::new(None),
        }
    }

    pub fn creating_without_url(payment_id: &str) -> Self {
        let mut gateway = Self::creating(payment_id, "");
        gateway.create_response.as_mut().unwrap().confirmation_url = None;
        gateway
    }

    pub fn reporting(provider_status: &str) -> Self {
        Self {
            create_response: None,
            fetch_status: Some(provider_status.to_string()),
            create_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            last_create: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            create_response: None,
            fetch_status: None,
            create_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            last_create: Mutex::new(None),
        }
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn last_create_request(&self) -> Option<CreatePaymentRequest> {
        self.last_create.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<PaymentSession, DomainError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_create.lock().unwrap() = Some(request.clone());
        self.create_response.clone().ok_or(DomainError::Gateway {
            status: 503,
            message: "provider unavailable".to_string(),
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentSession, DomainError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match &self.fetch_status {
            Some(status) => Ok(PaymentSession {
                id: payment_id.to_string(),
                status: status.clone(),
                confirmation_url: None,
            }),
            None => Err(DomainError::Gateway {
                status: 503,
                message: "provider unavailable".to_string(),
            }),
        }
    }
}
