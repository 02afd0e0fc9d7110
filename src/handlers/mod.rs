pub mod orders;
pub mod payments;
pub mod response;

use utoipa::OpenApi;

/// First declared field-level message, or the generic fallback.
pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .filter_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Ошибка валидации".to_string())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::my_orders,
        orders::admin_orders,
        orders::get_order,
        orders::update_status,
        payments::create_payment,
        payments::payment_status,
        payments::webhook,
    ),
    components(schemas(
        orders::CreateOrderRequest,
        orders::OrderItemRequest,
        orders::CreateOrderData,
        orders::OrderResponse,
        orders::OrderItemResponse,
        orders::OrderData,
        orders::OrderListData,
        orders::PaginationResponse,
        orders::UpdateStatusRequest,
        payments::CreatePaymentBody,
        payments::PaymentCreatedData,
        payments::AlreadyPaidData,
    )),
    tags(
        (name = "orders", description = "Order lifecycle"),
        (name = "payments", description = "Payment sessions and reconciliation"),
    )
)]
pub struct ApiDoc;
