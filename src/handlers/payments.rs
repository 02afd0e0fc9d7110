use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::application::payment_service::CreatePaymentOutcome;
use crate::auth::AuthUser;
use crate::domain::errors::DomainError;
use crate::domain::payment::WebhookEvent;
use crate::errors::AppError;
use crate::AppState;

use super::orders::{OrderData, OrderResponse};
use super::response::ApiResponse;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentBody {
    pub order_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreatedData {
    pub order_id: i32,
    pub payment_id: String,
    pub confirmation_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlreadyPaidData {
    pub already_paid: bool,
    pub order_id: i32,
    pub payment_status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/payments/create
///
/// Opens a payment session for the order and returns the provider's
/// confirmation URL for the client redirect. An already-paid order
/// short-circuits without contacting the provider.
#[utoipa::path(
    post,
    path = "/api/payments/create",
    request_body = CreatePaymentBody,
    responses(
        (status = 200, description = "Payment session created or order already paid", body = PaymentCreatedData),
        (status = 403, description = "Caller is neither the owner nor an admin"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Payment provider rejected the request"),
    ),
    tag = "payments"
)]
pub async fn create_payment(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<CreatePaymentBody>,
) -> Result<HttpResponse, AppError> {
    let outcome = state
        .payments
        .create_payment(user.to_requester(), body.order_id)
        .await?;

    let response = match outcome {
        CreatePaymentOutcome::AlreadyPaid {
            order_id,
            payment_status,
        } => HttpResponse::Ok().json(ApiResponse::success(AlreadyPaidData {
            already_paid: true,
            order_id,
            payment_status: payment_status.as_str().to_string(),
        })),
        CreatePaymentOutcome::Created {
            order_id,
            payment_id,
            confirmation_url,
        } => HttpResponse::Ok().json(ApiResponse::success(PaymentCreatedData {
            order_id,
            payment_id,
            confirmation_url,
        })),
    };
    Ok(response)
}

/// GET /api/payments/status/{orderId}
///
/// Current payment state of the order, refreshed from the provider when
/// possible. A provider outage never fails this endpoint; the last persisted
/// state is returned instead.
#[utoipa::path(
    get,
    path = "/api/payments/status/{order_id}",
    params(
        ("order_id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order with refreshed payment status", body = OrderData),
        (status = 403, description = "Caller is neither the owner nor an admin"),
        (status = 404, description = "Order not found"),
    ),
    tag = "payments"
)]
pub async fn payment_status(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order = state
        .payments
        .payment_status(user.to_requester(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(OrderData {
        order: OrderResponse::from(order),
    })))
}

/// POST /api/payments/webhook
///
/// Provider notification endpoint. Apart from a missing payment id, every
/// outcome (including internal failures) answers HTTP 200 so the provider
/// does not retry-storm over our own errors.
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    responses(
        (status = 200, description = "Event accepted (or ignored)"),
        (status = 400, description = "Payload carries no payment id"),
    ),
    tag = "payments"
)]
pub async fn webhook(state: web::Data<AppState>, body: web::Json<WebhookEvent>) -> HttpResponse {
    match state.payments.handle_webhook(body.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::ok()),
        Err(DomainError::Validation(message)) => {
            HttpResponse::BadRequest().json(json!({ "success": false, "message": message }))
        }
        Err(e) => {
            log::error!("webhook processing failed: {e}");
            HttpResponse::Ok().json(ApiResponse::ok())
        }
    }
}
