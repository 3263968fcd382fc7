//! eSewa Callback Use Case
//!
//! Handles the `data` parameter eSewa appends to the success redirect.

use crate::application::config::PaymentConfig;
use crate::application::verify_esewa::VerifyEsewaPaymentUseCase;
use crate::domain::gateway::EsewaGateway;
use crate::domain::repository::PaymentAttemptRepository;
use crate::domain::services::decode_esewa_callback;
use crate::domain::value_objects::{EsewaStatus, TransactionUuid};
use crate::error::{PaymentError, PaymentResult};
use std::sync::Arc;

/// Output DTO for the callback
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub transaction_uuid: TransactionUuid,
    /// Status claimed by the redirect payload
    pub reported_status: EsewaStatus,
    /// Settlement confirmed by the status API
    pub verified: bool,
}

pub struct HandleEsewaCallbackUseCase<G, R>
where
    G: EsewaGateway,
    R: PaymentAttemptRepository,
{
    verify: VerifyEsewaPaymentUseCase<G, R>,
    config: Arc<PaymentConfig>,
}

impl<G, R> HandleEsewaCallbackUseCase<G, R>
where
    G: EsewaGateway,
    R: PaymentAttemptRepository,
{
    pub fn new(gateway: Arc<G>, repo: Arc<R>, config: Arc<PaymentConfig>) -> Self {
        Self {
            verify: VerifyEsewaPaymentUseCase::new(gateway, repo, config.clone()),
            config,
        }
    }

    pub async fn execute(&self, data: &str) -> PaymentResult<CallbackOutcome> {
        let esewa = &self.config.esewa;
        let callback = decode_esewa_callback(data, &esewa.secret_key)?;

        if callback.product_code != esewa.product_code {
            return Err(PaymentError::InvalidCallback(
                "product code does not match this merchant".to_string(),
            ));
        }

        // A valid signature only proves origin; settlement comes from the status API
        let verified = self
            .verify
            .execute(callback.total_amount, &callback.transaction_uuid)
            .await;

        tracing::info!(
            transaction_uuid = %callback.transaction_uuid,
            transaction_code = callback.transaction_code.as_deref().unwrap_or("-"),
            reported_status = callback.status.as_wire(),
            verified,
            "eSewa callback processed"
        );

        Ok(CallbackOutcome {
            transaction_uuid: callback.transaction_uuid,
            reported_status: callback.status,
            verified,
        })
    }
}
