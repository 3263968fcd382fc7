//! Verify eSewa Payment Use Case

use crate::application::config::PaymentConfig;
use crate::application::ledger;
use crate::domain::entities::{AttemptStatus, EsewaStatusQuery, EsewaStatusReport};
use crate::domain::gateway::EsewaGateway;
use crate::domain::repository::PaymentAttemptRepository;
use crate::domain::value_objects::{Amount, Gateway, TransactionUuid};
use crate::error::PaymentResult;
use std::sync::Arc;

/// Confirm an eSewa transaction through the status API
pub struct VerifyEsewaPaymentUseCase<G, R>
where
    G: EsewaGateway,
    R: PaymentAttemptRepository,
{
    gateway: Arc<G>,
    repo: Arc<R>,
    config: Arc<PaymentConfig>,
}

impl<G, R> VerifyEsewaPaymentUseCase<G, R>
where
    G: EsewaGateway,
    R: PaymentAttemptRepository,
{
    pub fn new(gateway: Arc<G>, repo: Arc<R>, config: Arc<PaymentConfig>) -> Self {
        Self {
            gateway,
            repo,
            config,
        }
    }

    /// Fetch the gateway's status report and update the attempt ledger
    pub async fn status(
        &self,
        total_amount: Amount,
        transaction_uuid: &TransactionUuid,
    ) -> PaymentResult<EsewaStatusReport> {
        let query = EsewaStatusQuery {
            product_code: self.config.esewa.product_code.clone(),
            total_amount,
            transaction_uuid: transaction_uuid.clone(),
        };

        let report = self.gateway.check_status(&query).await?;

        ledger::record_status(
            self.repo.as_ref(),
            Gateway::Esewa,
            transaction_uuid.as_str(),
            AttemptStatus::from_esewa(&report.status),
            report.ref_id.clone(),
        )
        .await;

        Ok(report)
    }

    /// `true` only when eSewa reports exactly `COMPLETE`
    ///
    /// Gateway failures are logged and reported as `false`.
    pub async fn execute(&self, total_amount: Amount, transaction_uuid: &TransactionUuid) -> bool {
        match self.status(total_amount, transaction_uuid).await {
            Ok(report) => {
                let verified = report.status.is_complete();
                tracing::info!(
                    transaction_uuid = %transaction_uuid,
                    status = report.status.as_wire(),
                    verified,
                    "eSewa status checked"
                );
                verified
            }
            Err(e) => {
                tracing::warn!(
                    transaction_uuid = %transaction_uuid,
                    error = ?e,
                    "eSewa verification failed"
                );
                false
            }
        }
    }
}
