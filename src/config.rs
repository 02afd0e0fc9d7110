//! Application settings loaded from environment variables.

use std::env;

use crate::domain::errors::DomainError;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3001";
const DEFAULT_CURRENCY: &str = "RUB";
const DEFAULT_API_URL: &str = "https://api.yookassa.ru/v3";

/// Payment provider settings. Credentials are optional on purpose: a server
/// without payment configuration still serves every non-payment endpoint, and
/// the missing credentials only surface when a payment call is attempted.
#[derive(Clone)]
pub struct PaymentConfig {
    pub shop_id: Option<String>,
    pub secret_key: Option<String>,
    pub frontend_url: String,
    pub default_currency: String,
    pub api_url: String,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("shop_id", &self.shop_id.as_deref().map(|_| "[REDACTED]"))
            .field("secret_key", &self.secret_key.as_deref().map(|_| "[REDACTED]"))
            .field("frontend_url", &self.frontend_url)
            .field("default_currency", &self.default_currency)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl PaymentConfig {
    /// Read from the environment, accepting the legacy variable names as
    /// fallbacks.
    pub fn from_env() -> Self {
        Self {
            shop_id: env::var("YOOKASSA_SHOP_ID")
                .or_else(|_| env::var("YANDEX_KASSA_SHOP_ID"))
                .ok(),
            secret_key: env::var("YOOKASSA_SECRET_KEY")
                .or_else(|_| env::var("YANDEX_KASSA_SECRET_KEY"))
                .ok(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            default_currency: env::var("DEFAULT_CURRENCY")
                .unwrap_or_else(|_| DEFAULT_CURRENCY.to_string()),
            api_url: env::var("YOOKASSA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        }
    }

    /// Both credentials, or a configuration error raised at call time.
    pub fn credentials(&self) -> Result<(&str, &str), DomainError> {
        match (self.shop_id.as_deref(), self.secret_key.as_deref()) {
            (Some(shop_id), Some(secret_key)) => Ok((shop_id, secret_key)),
            _ => Err(DomainError::Configuration(
                "задайте YOOKASSA_SHOP_ID и YOOKASSA_SECRET_KEY".to_string(),
            )),
        }
    }
}

/// Server-level settings.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub payment: PaymentConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, using the insecure default");
            "your-secret-key".to_string()
        });
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            jwt_secret,
            payment: PaymentConfig::from_env(),
        }
    }
}
