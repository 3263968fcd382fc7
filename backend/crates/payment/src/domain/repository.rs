//! Repository Traits
//!
//! Interfaces for the payment attempt ledger. Implementation is in the
//! infrastructure layer.

use crate::domain::entities::{AttemptStatus, PaymentAttempt, StatusChange};
use crate::domain::value_objects::Gateway;
use crate::error::PaymentResult;

/// PaymentAttempt repository trait
#[trait_variant::make(PaymentAttemptRepository: Send)]
pub trait LocalPaymentAttemptRepository {
    /// Record a new attempt
    ///
    /// Fails with `DuplicateReference` if the gateway reference is taken.
    async fn insert(&self, attempt: &PaymentAttempt) -> PaymentResult<()>;

    /// Insert or replace an attempt
    async fn save(&self, attempt: &PaymentAttempt) -> PaymentResult<()>;

    /// Find an attempt by gateway and reference (transaction uuid or pidx)
    async fn find(&self, gateway: Gateway, reference: &str)
    -> PaymentResult<Option<PaymentAttempt>>;

    /// Apply a gateway report to the stored attempt atomically
    ///
    /// Transition rules are checked against the stored state, so concurrent
    /// verifications cannot overwrite each other. `None` if no attempt is
    /// recorded under the reference.
    async fn update_status(
        &self,
        gateway: Gateway,
        reference: &str,
        status: Option<AttemptStatus>,
        gateway_ref: Option<String>,
    ) -> PaymentResult<Option<StatusChange>>;
}
