//! Initiate Khalti Payment Use Case

use crate::application::config::{KHALTI_MIN_AMOUNT_PAISA, PaymentConfig};
use crate::domain::entities::{CustomerInfo, KhaltiInitiateRequest, KhaltiInitiation, PaymentAttempt};
use crate::domain::gateway::KhaltiGateway;
use crate::domain::repository::PaymentAttemptRepository;
use crate::domain::value_objects::{Amount, Gateway};
use crate::error::{PaymentError, PaymentResult};
use std::sync::Arc;

/// Input DTO for initiate Khalti payment
#[derive(Debug, Clone)]
pub struct InitiateKhaltiInput {
    /// Paisa
    pub amount: u64,
    pub purchase_order_id: String,
    pub purchase_order_name: String,
    pub customer_info: CustomerInfo,
}

fn required(field: &str, value: &str) -> PaymentResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PaymentError::InvalidOrder(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl InitiateKhaltiInput {
    fn validate(&self) -> PaymentResult<(String, String, CustomerInfo)> {
        if self.amount < KHALTI_MIN_AMOUNT_PAISA {
            return Err(PaymentError::InvalidAmount(format!(
                "Khalti requires at least {KHALTI_MIN_AMOUNT_PAISA} paisa (got {})",
                self.amount
            )));
        }
        let order_id = required("purchaseOrderId", &self.purchase_order_id)?;
        let order_name = required("purchaseOrderName", &self.purchase_order_name)?;
        let customer = CustomerInfo {
            name: required("customerInfo.name", &self.customer_info.name)?,
            email: optional(self.customer_info.email.as_deref()),
            phone: optional(self.customer_info.phone.as_deref()),
        };
        Ok((order_id, order_name, customer))
    }
}

/// Start a Khalti payment and record the attempt
pub struct InitiateKhaltiPaymentUseCase<G, R>
where
    G: KhaltiGateway,
    R: PaymentAttemptRepository,
{
    gateway: Arc<G>,
    repo: Arc<R>,
    config: Arc<PaymentConfig>,
}

impl<G, R> InitiateKhaltiPaymentUseCase<G, R>
where
    G: KhaltiGateway,
    R: PaymentAttemptRepository,
{
    pub fn new(gateway: Arc<G>, repo: Arc<R>, config: Arc<PaymentConfig>) -> Self {
        Self {
            gateway,
            repo,
            config,
        }
    }

    /// Returns Khalti's response unchanged
    pub async fn execute(&self, input: InitiateKhaltiInput) -> PaymentResult<KhaltiInitiation> {
        let khalti = self
            .config
            .khalti
            .as_ref()
            .ok_or(PaymentError::GatewayDisabled(Gateway::Khalti))?;
        let (purchase_order_id, purchase_order_name, customer_info) = input.validate()?;

        let request = KhaltiInitiateRequest {
            return_url: khalti.return_url.clone(),
            website_url: khalti.website_url.clone(),
            amount: input.amount,
            purchase_order_id,
            purchase_order_name,
            customer_info,
        };

        let initiation = self.gateway.initiate(&request).await?;

        let attempt = PaymentAttempt::new(
            Gateway::Khalti,
            initiation.pidx.as_str(),
            Some(request.purchase_order_id.clone()),
            Amount::from_paisa(request.amount),
        );
        // Khalti already holds the payment; losing the ledger row must not lose the payment_url
        if let Err(e) = self.repo.save(&attempt).await {
            tracing::warn!(pidx = %initiation.pidx, error = %e, "Failed to record Khalti attempt");
        }

        tracing::info!(
            attempt_id = %attempt.id,
            pidx = %initiation.pidx,
            purchase_order_id = %request.purchase_order_id,
            amount = request.amount,
            "Initiated Khalti payment"
        );

        Ok(initiation)
    }
}
