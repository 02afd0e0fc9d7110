use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::order::{OrderView, Requester};
use crate::domain::payment::{
    normalize_provider_status, CreatePaymentRequest, PaymentStatus, WebhookEvent,
};
use crate::domain::ports::{OrderRepository, PaymentGateway, PaymentInfoPatch};

/// Outcome of a create-payment call. Creating a payment for an order that is
/// already paid is an idempotent read and never contacts the provider.
#[derive(Debug, Clone)]
pub enum CreatePaymentOutcome {
    AlreadyPaid {
        order_id: i32,
        payment_status: PaymentStatus,
    },
    Created {
        order_id: i32,
        payment_id: String,
        confirmation_url: String,
    },
}

#[derive(Clone)]
pub struct PaymentService {
    repo: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    frontend_url: String,
}

impl PaymentService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        frontend_url: String,
    ) -> Self {
        Self {
            repo,
            gateway,
            frontend_url,
        }
    }

    /// Open a payment session for the order and persist the provider's
    /// response. Each call uses a fresh idempotency key: retrying after an
    /// unpaid attempt legitimately creates a new provider-side session.
    pub async fn create_payment(
        &self,
        requester: Requester,
        order_id: i32,
    ) -> Result<CreatePaymentOutcome, DomainError> {
        let order = self.load_order(order_id).await?;
        if !requester.can_access_order(order.user_id) {
            return Err(DomainError::Forbidden);
        }

        if order.payment_status == PaymentStatus::Paid {
            return Ok(CreatePaymentOutcome::AlreadyPaid {
                order_id: order.id,
                payment_status: order.payment_status,
            });
        }

        let request = CreatePaymentRequest {
            amount: order.total_amount.clone(),
            currency: order.currency.clone(),
            return_url: format!(
                "{}/order-success?orderId={}",
                self.frontend_url, order.id
            ),
            order_id: order.id,
            order_number: order.order_number.clone(),
            user_id: order.user_id,
        };

        let session = self.gateway.create_payment(&request).await?;

        let patch = PaymentInfoPatch {
            payment_id: Some(session.id.clone()),
            payment_confirmation_url: session.confirmation_url.clone(),
            payment_status: Some(PaymentStatus::from(session.status.as_str())),
        };
        let repo = self.repo.clone();
        run_blocking(move || repo.set_payment_info(order_id, patch)).await?;

        let confirmation_url = session.confirmation_url.ok_or(DomainError::Gateway {
            status: 500,
            message: "Не удалось получить ссылку на оплату".to_string(),
        })?;

        Ok(CreatePaymentOutcome::Created {
            order_id: order.id,
            payment_id: session.id,
            confirmation_url,
        })
    }

    /// Current payment state of the order, refreshed from the provider when a
    /// session exists and the order is not yet paid. A provider failure during
    /// the refresh is logged and swallowed; the caller still gets the last
    /// persisted state.
    pub async fn payment_status(
        &self,
        requester: Requester,
        order_id: i32,
    ) -> Result<OrderView, DomainError> {
        let order = self.load_order(order_id).await?;
        if !requester.can_access_order(order.user_id) {
            return Err(DomainError::Forbidden);
        }

        if let Some(payment_id) = order.payment_id.clone() {
            if order.payment_status != PaymentStatus::Paid {
                if let Err(e) = self.refresh_from_provider(order.id, &payment_id).await {
                    log::warn!(
                        "payment status refresh failed for order {}: {}",
                        order.id,
                        e
                    );
                } else {
                    return self.load_order(order_id).await;
                }
            }
        }

        Ok(order)
    }

    async fn refresh_from_provider(
        &self,
        order_id: i32,
        payment_id: &str,
    ) -> Result<(), DomainError> {
        let session = self.gateway.fetch_payment(payment_id).await?;
        let normalized = normalize_provider_status(&session.status);

        let repo = self.repo.clone();
        let payment_id = payment_id.to_string();
        run_blocking(move || match normalized {
            PaymentStatus::Paid => repo.mark_paid_by_payment_id(&payment_id).map(|_| ()),
            PaymentStatus::Failed => repo.mark_failed_by_payment_id(&payment_id).map(|_| ()),
            other => repo.set_payment_info(
                order_id,
                PaymentInfoPatch {
                    payment_status: Some(other),
                    ..PaymentInfoPatch::default()
                },
            ),
        })
        .await
    }

    /// Apply a provider webhook event. Unknown events are no-ops; a payload
    /// without a payment id is a validation error. Lookup by external id
    /// matching no order changes zero rows and is not an error.
    pub async fn handle_webhook(&self, event: WebhookEvent) -> Result<(), DomainError> {
        let payment_id = event
            .object
            .and_then(|o| o.id)
            .ok_or_else(|| DomainError::Validation("Нет payment id".to_string()))?;

        let repo = self.repo.clone();
        match event.event.as_deref() {
            Some("payment.succeeded") => {
                let changed =
                    run_blocking(move || repo.mark_paid_by_payment_id(&payment_id)).await?;
                log::info!("webhook payment.succeeded marked {changed} order(s) paid");
            }
            Some("payment.canceled") => {
                let changed =
                    run_blocking(move || repo.mark_failed_by_payment_id(&payment_id)).await?;
                log::info!("webhook payment.canceled marked {changed} order(s) failed");
            }
            other => {
                log::debug!("ignoring webhook event {:?}", other);
            }
        }
        Ok(())
    }

    async fn load_order(&self, order_id: i32) -> Result<OrderView, DomainError> {
        let repo = self.repo.clone();
        run_blocking(move || repo.find_by_id(order_id))
            .await?
            .ok_or(DomainError::OrderNotFound)
    }
}

/// Run blocking repository work off the async executor.
async fn run_blocking<T, F>(f: F) -> Result<T, DomainError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
}
