//! Gateway Traits
//!
//! Outbound calls to the payment providers. The reqwest implementation is
//! in the infrastructure layer; tests substitute fakes.

use crate::domain::entities::{
    EsewaStatusQuery, EsewaStatusReport, KhaltiInitiateRequest, KhaltiInitiation, KhaltiLookup,
};
use crate::domain::value_objects::Pidx;
use crate::error::PaymentResult;

/// eSewa transaction status API
#[trait_variant::make(EsewaGateway: Send)]
pub trait LocalEsewaGateway {
    async fn check_status(&self, query: &EsewaStatusQuery) -> PaymentResult<EsewaStatusReport>;
}

/// Khalti ePayment API
#[trait_variant::make(KhaltiGateway: Send)]
pub trait LocalKhaltiGateway {
    /// Start a payment; the response carries the `payment_url` to redirect to
    async fn initiate(&self, request: &KhaltiInitiateRequest) -> PaymentResult<KhaltiInitiation>;

    async fn lookup(&self, pidx: &Pidx) -> PaymentResult<KhaltiLookup>;
}
