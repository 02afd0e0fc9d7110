use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::order_service::{CreateOrderInput, OrderItemInput};
use crate::auth::AuthUser;
use crate::domain::order::{Address, OrderStatus, OrderView};
use crate::errors::AppError;
use crate::AppState;

use super::response::ApiResponse;
use super::validation_message;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Заказ не содержит товаров"))]
    pub items: Vec<OrderItemRequest>,
    #[schema(value_type = Object)]
    pub shipping_address: Address,
    #[schema(value_type = Object)]
    pub billing_address: Option<Address>,
    pub payment_method: String,
    pub shipping_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderData {
    pub order_id: i32,
    pub order_number: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_images: Vec<String>,
    pub quantity: i32,
    /// Decimal amounts are rendered as strings, e.g. "999.00".
    pub price: String,
    pub total: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    pub order_number: String,
    pub status: String,
    pub status_text: String,
    pub total_amount: String,
    pub shipping_amount: String,
    pub discount_amount: String,
    pub tax_amount: String,
    pub currency: String,
    #[schema(value_type = Object)]
    pub shipping_address: serde_json::Value,
    #[schema(value_type = Object)]
    pub billing_address: Option<serde_json::Value>,
    pub payment_method: String,
    pub payment_status: String,
    pub payment_status_text: String,
    pub payment_id: Option<String>,
    pub payment_paid_at: Option<String>,
    pub shipping_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            status: order.status.as_str().to_string(),
            status_text: order.status.text().to_string(),
            total_amount: order.total_amount.to_string(),
            shipping_amount: order.shipping_amount.to_string(),
            discount_amount: order.discount_amount.to_string(),
            tax_amount: order.tax_amount.to_string(),
            currency: order.currency,
            shipping_address: order.shipping_address,
            billing_address: order.billing_address,
            payment_method: order.payment_method,
            payment_status: order.payment_status.as_str().to_string(),
            payment_status_text: order.payment_status.text().to_string(),
            payment_id: order.payment_id,
            payment_paid_at: order.payment_paid_at.map(|t| t.to_rfc3339()),
            shipping_method: order.shipping_method,
            notes: order.notes,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    product_sku: item.product_sku,
                    product_images: item.product_images,
                    quantity: item.quantity,
                    price: item.price.to_string(),
                    total: item.total.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderData {
    pub order: OrderResponse,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    /// Page number (1-based).
    pub page: Option<i64>,
    /// Items per page, at most 50.
    pub limit: Option<i64>,
    /// Optional status filter.
    pub status: Option<String>,
}

impl OrderListQuery {
    /// Validated `(page, limit, status)` triple with the handler's defaults.
    fn resolve(
        self,
        default_limit: i64,
    ) -> Result<(i64, i64, Option<OrderStatus>), AppError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::Validation("Неверный номер страницы".to_string()));
        }
        let limit = self.limit.unwrap_or(default_limit);
        if !(1..=50).contains(&limit) {
            return Err(AppError::Validation(
                "Лимит должен быть от 1 до 50".to_string(),
            ));
        }
        let status = self
            .status
            .as_deref()
            .map(OrderStatus::parse_known)
            .transpose()?;
        Ok((page, limit, status))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderListData {
    pub orders: Vec<OrderResponse>,
    pub pagination: PaginationResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Creates an order from cart contents. Unit prices are the catalog's
/// current prices; the order and its items are written in one transaction.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderData),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Referenced product does not exist"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    body.validate()
        .map_err(|e| AppError::Validation(validation_message(&e)))?;

    let input = CreateOrderInput {
        items: body
            .items
            .iter()
            .map(|item| OrderItemInput {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect(),
        shipping_address: body.shipping_address,
        billing_address: body.billing_address,
        payment_method: body.payment_method,
        shipping_method: body.shipping_method,
        notes: body.notes,
    };

    let service = state.orders.clone();
    let user_id = user.id;
    let created = web::block(move || service.create_order(user_id, input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        CreateOrderData {
            order_id: created.id,
            order_number: created.order_number,
        },
        "Заказ успешно создан",
    )))
}

/// GET /api/orders/my-orders
///
/// The caller's own orders, newest first.
#[utoipa::path(
    get,
    path = "/api/orders/my-orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 10, max 50)"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
    ),
    responses(
        (status = 200, description = "Paginated list of the caller's orders", body = OrderListData),
        (status = 400, description = "Invalid pagination parameters"),
    ),
    tag = "orders"
)]
pub async fn my_orders(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse, AppError> {
    let (page, limit, status) = query.into_inner().resolve(10)?;
    let offset = (page - 1) * limit;

    let service = state.orders.clone();
    let user_id = user.id;
    let orders = web::block(move || service.list_my_orders(user_id, limit, offset, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let returned = orders.len() as i64;
    let data = OrderListData {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
        pagination: PaginationResponse {
            page,
            limit,
            // Approximation: one page of look-ahead instead of a COUNT(*).
            total_count: offset + returned,
            has_next: returned == limit,
            has_prev: page > 1,
        },
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// GET /api/orders/admin/all
///
/// Every order in the store; admin only.
#[utoipa::path(
    get,
    path = "/api/orders/admin/all",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 50)"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
    ),
    responses(
        (status = 200, description = "Paginated list of all orders", body = OrderListData),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "orders"
)]
pub async fn admin_orders(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let (page, limit, status) = query.into_inner().resolve(20)?;
    let offset = (page - 1) * limit;

    let service = state.orders.clone();
    let (orders, total) = web::block(move || service.list_all_orders(limit, offset, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let data = OrderListData {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
        pagination: PaginationResponse {
            page,
            limit,
            total_count: total,
            has_next: page * limit < total,
            has_prev: page > 1,
        },
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// GET /api/orders/{id}
///
/// Full order view including line items; owner or admin only.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderData),
        (status = 403, description = "Caller is neither the owner nor an admin"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let service = state.orders.clone();
    let requester = user.to_requester();
    let order = web::block(move || service.get_order(requester, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ApiResponse::success(OrderData {
        order: order.into(),
    })))
}

/// PATCH /api/orders/{id}/status
///
/// Set the order status; admin only. Any known status may be set in any
/// order, matching the storefront's permissive workflow.
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Unknown status value"),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "orders"
)]
pub async fn update_status(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let order_id = path.into_inner();
    let status = OrderStatus::parse_known(&body.status)?;

    let service = state.orders.clone();
    web::block(move || service.update_status(order_id, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Статус заказа обновлен")))
}
