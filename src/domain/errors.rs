use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    OrderNotFound,
    #[error("Product {0} not found")]
    ProductNotFound(i32),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid payment method: {0}")]
    PaymentMethodInvalid(String),
    #[error("Access denied")]
    Forbidden,
    #[error("Payment gateway error ({status}): {message}")]
    Gateway { status: u16, message: String },
    #[error("Payment provider is not configured: {0}")]
    Configuration(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
