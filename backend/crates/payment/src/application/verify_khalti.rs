//! Verify Khalti Payment Use Case

use crate::application::ledger;
use crate::domain::entities::{AttemptStatus, KhaltiLookup};
use crate::domain::gateway::KhaltiGateway;
use crate::domain::repository::PaymentAttemptRepository;
use crate::domain::value_objects::{Gateway, Pidx};
use crate::error::PaymentResult;
use std::sync::Arc;

/// Confirm a Khalti payment through the lookup API
pub struct VerifyKhaltiPaymentUseCase<G, R>
where
    G: KhaltiGateway,
    R: PaymentAttemptRepository,
{
    gateway: Arc<G>,
    repo: Arc<R>,
}

impl<G, R> VerifyKhaltiPaymentUseCase<G, R>
where
    G: KhaltiGateway,
    R: PaymentAttemptRepository,
{
    pub fn new(gateway: Arc<G>, repo: Arc<R>) -> Self {
        Self { gateway, repo }
    }

    /// Fetch the lookup result and update the attempt ledger
    pub async fn lookup(&self, pidx: &Pidx) -> PaymentResult<KhaltiLookup> {
        let lookup = self.gateway.lookup(pidx).await?;

        ledger::record_status(
            self.repo.as_ref(),
            Gateway::Khalti,
            pidx.as_str(),
            AttemptStatus::from_khalti(&lookup.status),
            lookup.transaction_id.clone(),
        )
        .await;

        Ok(lookup)
    }

    /// `true` only when Khalti reports exactly `Completed`
    pub async fn execute(&self, pidx: &Pidx) -> bool {
        match self.lookup(pidx).await {
            Ok(lookup) => {
                let verified = lookup.status.is_completed();
                tracing::info!(
                    pidx = %pidx,
                    status = lookup.status.as_wire(),
                    total_amount = ?lookup.total_amount,
                    refunded = lookup.refunded,
                    verified,
                    "Khalti lookup checked"
                );
                verified
            }
            Err(e) => {
                tracing::warn!(pidx = %pidx, error = ?e, "Khalti verification failed");
                false
            }
        }
    }
}
