use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// HTTP-facing error. Client messages are short and localized; internal
/// detail is logged, never echoed in the response body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Gateway(String),
    #[error("{0}")]
    Configuration(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::OrderNotFound => AppError::NotFound("Заказ не найден".to_string()),
            DomainError::ProductNotFound(id) => {
                AppError::NotFound(format!("Товар с ID {id} не найден"))
            }
            DomainError::Validation(message) => AppError::Validation(message),
            DomainError::PaymentMethodInvalid(_) => {
                AppError::Validation("Неверный метод оплаты".to_string())
            }
            DomainError::Forbidden => AppError::Forbidden("Доступ запрещен".to_string()),
            DomainError::Gateway { status, message } => {
                log::error!("payment gateway error ({status}): {message}");
                AppError::Gateway(message)
            }
            DomainError::Configuration(message) => {
                AppError::Configuration(format!("YooKassa не настроена: {message}"))
            }
            DomainError::Internal(message) => AppError::Internal(message),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Gateway(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Internal detail stays in the log.
            AppError::Internal(detail) => {
                log::error!("internal error: {detail}");
                "Ошибка сервера".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": message,
        }))
    }
}
