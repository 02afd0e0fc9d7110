//! HTTP client for the YooKassa payments API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PaymentConfig;
use crate::domain::errors::DomainError;
use crate::domain::payment::{format_amount, CreatePaymentRequest, PaymentSession};
use crate::domain::ports::PaymentGateway;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct YooKassaClient {
    http: reqwest::Client,
    config: PaymentConfig,
}

impl YooKassaClient {
    pub fn new(config: PaymentConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self { http, config }
    }

    async fn read_payment(&self, response: reqwest::Response) -> Result<PaymentObject, DomainError> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let parsed: Option<ProviderError> = serde_json::from_str(&text).ok();
            let message = parsed
                .and_then(|e| e.description.or(e.message))
                .filter(|m| !m.is_empty())
                .or_else(|| (!text.is_empty()).then(|| text.clone()))
                .unwrap_or_else(|| format!("YooKassa error {}", status.as_u16()));
            return Err(DomainError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| DomainError::Gateway {
            status: status.as_u16(),
            message: format!("unexpected provider response: {e}"),
        })
    }
}

#[async_trait]
impl PaymentGateway for YooKassaClient {
    async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<PaymentSession, DomainError> {
        let (shop_id, secret_key) = self.config.credentials()?;

        let body = CreatePaymentBody {
            amount: Amount {
                value: format_amount(&request.amount),
                currency: &request.currency,
            },
            confirmation: ConfirmationRequest {
                kind: "redirect",
                return_url: &request.return_url,
            },
            capture: true,
            description: format!("Оплата заказа {}", request.order_number),
            metadata: Metadata {
                order_id: request.order_id.to_string(),
                order_number: request.order_number.clone(),
                user_id: request.user_id.to_string(),
            },
        };

        let response = self
            .http
            .post(format!("{}/payments", self.config.api_url))
            .basic_auth(shop_id, Some(secret_key))
            // A fresh key per attempt: retries of the same HTTP request are
            // deduplicated by the provider, separate attempts are not.
            .header("Idempotence-Key", Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        Ok(self.read_payment(response).await?.into())
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentSession, DomainError> {
        let (shop_id, secret_key) = self.config.credentials()?;

        let response = self
            .http
            .get(format!("{}/payments/{payment_id}", self.config.api_url))
            .basic_auth(shop_id, Some(secret_key))
            .send()
            .await
            .map_err(transport_error)?;

        Ok(self.read_payment(response).await?.into())
    }
}

fn transport_error(e: reqwest::Error) -> DomainError {
    DomainError::Gateway {
        status: e.status().map(|s| s.as_u16()).unwrap_or(503),
        message: e.to_string(),
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Amount<'a> {
    value: String,
    currency: &'a str,
}

#[derive(Debug, Serialize)]
struct ConfirmationRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    return_url: &'a str,
}

#[derive(Debug, Serialize)]
struct Metadata {
    order_id: String,
    order_number: String,
    user_id: String,
}

#[derive(Debug, Serialize)]
struct CreatePaymentBody<'a> {
    amount: Amount<'a>,
    confirmation: ConfirmationRequest<'a>,
    capture: bool,
    description: String,
    metadata: Metadata,
}

#[derive(Debug, Deserialize)]
struct PaymentObject {
    id: String,
    status: String,
    #[serde(default)]
    confirmation: Option<ConfirmationResponse>,
}

#[derive(Debug, Deserialize)]
struct ConfirmationResponse {
    #[serde(default)]
    confirmation_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<PaymentObject> for PaymentSession {
    fn from(payment: PaymentObject) -> Self {
        PaymentSession {
            id: payment.id,
            status: payment.status,
            confirmation_url: payment.confirmation.and_then(|c| c.confirmation_url),
        }
    }
}
