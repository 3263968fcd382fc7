//! Payment Router

use crate::application::config::PaymentConfig;
use crate::domain::gateway::{EsewaGateway, KhaltiGateway};
use crate::domain::repository::PaymentAttemptRepository;
use crate::infra::http::HttpPaymentGateway;
use crate::infra::memory::InMemoryAttemptRepository;
use crate::presentation::handlers::{self, PaymentAppState};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Create the payment router with the HTTP gateways and in-memory ledger
pub fn payment_router(
    gateway: HttpPaymentGateway,
    repo: InMemoryAttemptRepository,
    config: Arc<PaymentConfig>,
) -> Router {
    payment_router_generic(gateway, repo, config)
}

/// Create a generic payment router for any gateway and repository implementation
pub fn payment_router_generic<G, R>(gateway: G, repo: R, config: Arc<PaymentConfig>) -> Router
where
    G: EsewaGateway + KhaltiGateway + Clone + Send + Sync + 'static,
    R: PaymentAttemptRepository + Clone + Send + Sync + 'static,
{
    let state = PaymentAppState {
        gateway: Arc::new(gateway),
        repo: Arc::new(repo),
        config,
    };

    Router::new()
        .route("/esewa/initiate", post(handlers::initiate_esewa::<G, R>))
        .route("/esewa/verify", get(handlers::verify_esewa::<G, R>))
        .route("/esewa/callback", get(handlers::esewa_callback::<G, R>))
        .route("/khalti/initiate", post(handlers::initiate_khalti::<G, R>))
        .route("/khalti/verify", post(handlers::verify_khalti::<G, R>))
        .route(
            "/attempts/{gateway}/{reference}",
            get(handlers::get_attempt::<G, R>),
        )
        .with_state(state)
}
