//! Initiate eSewa Payment Use Case

use crate::application::config::PaymentConfig;
use crate::domain::entities::{EsewaPaymentForm, PaymentAttempt};
use crate::domain::repository::PaymentAttemptRepository;
use crate::domain::services::generate_esewa_signature;
use crate::domain::value_objects::{Amount, Gateway, TransactionUuid};
use crate::error::{PaymentError, PaymentResult};
use std::sync::Arc;

/// Input DTO for initiate eSewa payment
#[derive(Debug, Clone)]
pub struct InitiateEsewaInput {
    pub amount: Amount,
    pub tax_amount: Amount,
    pub product_service_charge: Amount,
    pub product_delivery_charge: Amount,
    /// Generated when absent
    pub transaction_uuid: Option<TransactionUuid>,
}

impl InitiateEsewaInput {
    pub fn new(amount: Amount) -> Self {
        Self {
            amount,
            tax_amount: Amount::ZERO,
            product_service_charge: Amount::ZERO,
            product_delivery_charge: Amount::ZERO,
            transaction_uuid: None,
        }
    }

    /// amount + tax + service charge + delivery charge
    pub fn total_amount(&self) -> PaymentResult<Amount> {
        self.amount
            .checked_add(self.tax_amount)
            .and_then(|t| t.checked_add(self.product_service_charge))
            .and_then(|t| t.checked_add(self.product_delivery_charge))
            .ok_or_else(|| PaymentError::InvalidAmount("total amount overflows".to_string()))
    }
}

/// Output DTO for initiate eSewa payment
#[derive(Debug, Clone)]
pub struct EsewaCheckout {
    /// Where the browser posts `fields`
    pub form_url: String,
    pub fields: EsewaPaymentForm,
}

/// Build a signed eSewa form and record the attempt
pub struct InitiateEsewaPaymentUseCase<R>
where
    R: PaymentAttemptRepository,
{
    repo: Arc<R>,
    config: Arc<PaymentConfig>,
}

impl<R> InitiateEsewaPaymentUseCase<R>
where
    R: PaymentAttemptRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<PaymentConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: InitiateEsewaInput) -> PaymentResult<EsewaCheckout> {
        if input.amount.is_zero() {
            return Err(PaymentError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }
        let total_amount = input.total_amount()?;
        let transaction_uuid = input
            .transaction_uuid
            .clone()
            .unwrap_or_else(TransactionUuid::generate);

        let esewa = &self.config.esewa;
        let signed = generate_esewa_signature(
            total_amount,
            &transaction_uuid,
            &esewa.product_code,
            &esewa.secret_key,
        );

        let attempt = PaymentAttempt::new(Gateway::Esewa, transaction_uuid.as_str(), None, total_amount);
        self.repo.insert(&attempt).await?;

        tracing::info!(
            attempt_id = %attempt.id,
            transaction_uuid = %transaction_uuid,
            total_amount = %total_amount,
            "Initiated eSewa payment"
        );

        Ok(EsewaCheckout {
            form_url: esewa.form_url.clone(),
            fields: EsewaPaymentForm {
                amount: input.amount.to_gateway_string(),
                tax_amount: input.tax_amount.to_gateway_string(),
                total_amount: signed.total_amount.to_gateway_string(),
                transaction_uuid: signed.transaction_uuid.as_str().to_string(),
                product_code: signed.product_code.as_str().to_string(),
                product_service_charge: input.product_service_charge.to_gateway_string(),
                product_delivery_charge: input.product_delivery_charge.to_gateway_string(),
                success_url: esewa.success_url.clone(),
                failure_url: esewa.failure_url.clone(),
                signed_field_names: signed.signed_field_names.to_string(),
                signature: signed.signature,
            },
        })
    }
}
