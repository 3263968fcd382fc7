//! Attempt ledger bookkeeping shared by the verification use cases

use crate::domain::entities::AttemptStatus;
use crate::domain::repository::PaymentAttemptRepository;
use crate::domain::value_objects::Gateway;

/// Apply a gateway-reported status to a recorded attempt
///
/// Unknown references are ignored: verification also works for payments
/// started elsewhere. Ledger failures are logged, never returned.
pub(crate) async fn record_status<R>(
    repo: &R,
    gateway: Gateway,
    reference: &str,
    status: Option<AttemptStatus>,
    gateway_ref: Option<String>,
) where
    R: PaymentAttemptRepository,
{
    let change = match repo
        .update_status(gateway, reference, status, gateway_ref)
        .await
    {
        Ok(Some(change)) => change,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(%gateway, reference, error = %e, "Failed to update attempt");
            return;
        }
    };

    if !change.accepted {
        tracing::warn!(
            %gateway,
            reference,
            from = ?change.from,
            to = ?status,
            "Ignoring status regression"
        );
    } else if change.changed() {
        tracing::info!(
            %gateway,
            reference,
            from = ?change.from,
            to = ?change.to,
            "Payment attempt status changed"
        );
    }
}
