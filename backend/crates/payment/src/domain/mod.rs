//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (PaymentAttempt, gateway payloads)
//! - Domain value objects (Amount, TransactionUuid, Pidx, gateway statuses)
//! - Domain services (eSewa signing and callback verification)
//! - Repository and gateway traits (interfaces)

pub mod entities;
pub mod gateway;
pub mod repository;
pub mod services;
pub mod value_objects;
