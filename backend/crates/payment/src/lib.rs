//! Payment Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Signing rules, entities, gateway and repository traits
//! - `application/` - Use cases and configuration
//! - `infra/` - reqwest gateway clients, in-memory attempt ledger
//! - `presentation/` - HTTP handlers
//!
//! ## Security Model
//! - The merchant secret never leaves the backend; browsers only receive signed forms
//! - Redirect payloads are signature-checked and then confirmed with the gateway
//! - Verification answers `true` only for the gateway's exact success literal
//! - Production refuses to start with missing or public sandbox credentials

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::PaymentConfig;
pub use domain::services::generate_esewa_signature;
pub use domain::value_objects::Gateway;
pub use error::{PaymentError, PaymentResult};
pub use infra::http::HttpPaymentGateway;
pub use infra::memory::InMemoryAttemptRepository;
pub use presentation::router::{payment_router, payment_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult, OptionExt, ResultExt},
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;
